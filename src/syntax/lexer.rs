//! Logos-based MiniZinc tokenizer.
//!
//! Every byte of the input ends up in exactly one token: whitespace and
//! comments are kept, and unrecognised input becomes `UNKNOWN`.

use logos::Logos;

use super::kind::SyntaxKind::{self, *};
use crate::base::{TextRange, TextSize};

/// A token with its source slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'t> {
    pub kind: SyntaxKind,
    pub text: &'t str,
    pub range: TextRange,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum LexToken {
    #[regex(r"[ \t\r\f]+")]
    Whitespace,
    #[token("\n")]
    Newline,
    #[regex(r"%[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", ident_kind)]
    Word(SyntaxKind),
    #[regex(r"[0-9]+", number_kind)]
    Number(SyntaxKind),
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[|")]
    LBrackPipe,
    #[token("|]")]
    PipeRBrack,
    #[token("|")]
    Pipe,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("::")]
    Colon2,
    #[token("..")]
    Dot2,
    #[token("=")]
    Eq,
    #[token("==")]
    Eq2,
    #[token("!=")]
    Neq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("++")]
    Plus2,
    #[token("->")]
    Implies,
    #[token("<-")]
    RImplies,
    #[token("<->")]
    Equiv,
    #[token("/\\")]
    And,
    #[token("\\/")]
    Or,
}

fn ident_kind(lex: &mut logos::Lexer<LexToken>) -> SyntaxKind {
    keyword(lex.slice()).unwrap_or(IDENT)
}

/// Integer literals, extended in place to floats when a fraction or exponent follows.
fn number_kind(lex: &mut logos::Lexer<LexToken>) -> SyntaxKind {
    let rest = lex.remainder().as_bytes();
    let digits = |from: usize| {
        rest.get(from..)
            .map_or(0, |tail| tail.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut len = 0;
    if rest.first() == Some(&b'.') && digits(1) > 0 {
        len = 1 + digits(1);
    }
    if matches!(rest.get(len), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(rest.get(len + 1), Some(b'+' | b'-')));
        let exp = digits(len + 1 + sign);
        if exp > 0 {
            len += 1 + sign + exp;
        }
    }

    if len == 0 {
        INT_NUMBER
    } else {
        lex.bump(len);
        FLOAT_NUMBER
    }
}

fn keyword(word: &str) -> Option<SyntaxKind> {
    let kind = match word {
        "ann" => ANN_KW,
        "annotation" => ANNOTATION_KW,
        "array" => ARRAY_KW,
        "bool" => BOOL_KW,
        "constraint" => CONSTRAINT_KW,
        "diff" => DIFF_KW,
        "div" => DIV_KW,
        "else" => ELSE_KW,
        "elseif" => ELSEIF_KW,
        "endif" => ENDIF_KW,
        "enum" => ENUM_KW,
        "false" => FALSE_KW,
        "float" => FLOAT_KW,
        "function" => FUNCTION_KW,
        "if" => IF_KW,
        "in" => IN_KW,
        "include" => INCLUDE_KW,
        "int" => INT_KW,
        "intersect" => INTERSECT_KW,
        "let" => LET_KW,
        "maximize" => MAXIMIZE_KW,
        "minimize" => MINIMIZE_KW,
        "mod" => MOD_KW,
        "not" => NOT_KW,
        "of" => OF_KW,
        "opt" => OPT_KW,
        "output" => OUTPUT_KW,
        "par" => PAR_KW,
        "predicate" => PREDICATE_KW,
        "satisfy" => SATISFY_KW,
        "set" => SET_KW,
        "solve" => SOLVE_KW,
        "string" => STRING_KW,
        "subset" => SUBSET_KW,
        "superset" => SUPERSET_KW,
        "symdiff" => SYMDIFF_KW,
        "test" => TEST_KW,
        "then" => THEN_KW,
        "true" => TRUE_KW,
        "union" => UNION_KW,
        "var" => VAR_KW,
        "where" => WHERE_KW,
        "xor" => XOR_KW,
        _ => return None,
    };
    Some(kind)
}

impl LexToken {
    fn kind(self) -> SyntaxKind {
        match self {
            LexToken::Whitespace => WHITESPACE,
            LexToken::Newline => NEWLINE,
            LexToken::LineComment => LINE_COMMENT,
            LexToken::BlockComment => BLOCK_COMMENT,
            LexToken::Word(kind) | LexToken::Number(kind) => kind,
            LexToken::String => STRING,
            LexToken::LParen => L_PAREN,
            LexToken::RParen => R_PAREN,
            LexToken::LBrack => L_BRACK,
            LexToken::RBrack => R_BRACK,
            LexToken::LBrace => L_BRACE,
            LexToken::RBrace => R_BRACE,
            LexToken::LBrackPipe => L_BRACK_PIPE,
            LexToken::PipeRBrack => PIPE_R_BRACK,
            LexToken::Pipe => PIPE,
            LexToken::Comma => COMMA,
            LexToken::Semi => SEMI,
            LexToken::Colon => COLON,
            LexToken::Colon2 => COLON2,
            LexToken::Dot2 => DOT2,
            LexToken::Eq => EQ,
            LexToken::Eq2 => EQ2,
            LexToken::Neq => NEQ,
            LexToken::Lt => LT,
            LexToken::LtEq => LTEQ,
            LexToken::Gt => GT,
            LexToken::GtEq => GTEQ,
            LexToken::Plus => PLUS,
            LexToken::Minus => MINUS,
            LexToken::Star => STAR,
            LexToken::Slash => SLASH,
            LexToken::Caret => CARET,
            LexToken::Plus2 => PLUS2,
            LexToken::Implies => IMPLIES,
            LexToken::RImplies => RIMPLIES,
            LexToken::Equiv => EQUIV,
            LexToken::And => AND,
            LexToken::Or => OR,
        }
    }
}

/// Tokenize `source`. The concatenated token texts equal the input.
pub fn lex(source: &str) -> Vec<Lexeme<'_>> {
    let mut lexer = LexToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.map_or(UNKNOWN, LexToken::kind);
        tokens.push(Lexeme {
            kind,
            text: &source[span.clone()],
            range: TextRange::new(
                TextSize::from(span.start as u32),
                TextSize::from(span.end as u32),
            ),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        lex(source)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_lossless() {
        let source = "var 1..n: x; % comment\nconstraint x /\\ y != 3.5e2;";
        let text: String = lex(source).iter().map(|t| t.text).collect();
        assert_eq!(text, source);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(kinds("constraint truth true"), vec![CONSTRAINT_KW, IDENT, TRUE_KW]);
    }

    #[test]
    fn test_numbers_and_ranges() {
        assert_eq!(kinds("1..n"), vec![INT_NUMBER, DOT2, IDENT]);
        assert_eq!(kinds("1.5"), vec![FLOAT_NUMBER]);
        assert_eq!(kinds("2e10 3.0E-2"), vec![FLOAT_NUMBER, FLOAT_NUMBER]);
        assert_eq!(kinds("4e"), vec![INT_NUMBER, IDENT]);
    }

    #[test]
    fn test_two_dimensional_array_delimiters() {
        assert_eq!(
            kinds("[| 1, 2 | 3, 4 |]"),
            vec![
                L_BRACK_PIPE,
                INT_NUMBER,
                COMMA,
                INT_NUMBER,
                PIPE,
                INT_NUMBER,
                COMMA,
                INT_NUMBER,
                PIPE_R_BRACK
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(kinds("% all of this\nx"), vec![LINE_COMMENT, IDENT]);
        assert_eq!(kinds("/* a * b */ x"), vec![BLOCK_COMMENT, IDENT]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a <-> b -> c <- d \\/ e ++ f <= g"),
            vec![
                IDENT, EQUIV, IDENT, IMPLIES, IDENT, RIMPLIES, IDENT, OR, IDENT, PLUS2, IDENT, LTEQ,
                IDENT
            ]
        );
    }

    #[test]
    fn test_unknown_input() {
        assert_eq!(kinds("x $ y"), vec![IDENT, UNKNOWN, IDENT]);
        assert_eq!(kinds("é x \"é\""), vec![UNKNOWN, IDENT, STRING]);
        assert_eq!(lex("é")[0].text, "é");
    }
}
