//! Tokenizer for the S-expression query language.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|;[^\n]*)")]
pub(super) enum QueryToken {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"@[A-Za-z_][A-Za-z0-9_.\-]*")]
    Capture,
    #[regex(r"#[A-Za-z_][A-Za-z0-9_\-]*[?!]?")]
    Predicate,
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,
}

/// A query token; `Err` marks input no token matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Lexed<'q> {
    pub token: Result<QueryToken, ()>,
    pub text: &'q str,
    pub span: Range<usize>,
}

pub(super) fn lex(source: &str) -> Vec<Lexed<'_>> {
    let mut lexer = QueryToken::lexer(source);
    let mut out = Vec::new();
    while let Some(token) = lexer.next() {
        out.push(Lexed {
            token,
            text: lexer.slice(),
            span: lexer.span(),
        });
    }
    out
}

/// Strip the quotes from a string token and resolve its escapes.
pub(super) fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
