//! Parsing and validating query source against a grammar schema.

use regex::Regex;
use smol_str::SmolStr;

use super::QueryError;
use super::lexer::{Lexed, QueryToken, lex, unquote};
use super::pattern::{CaptureId, ChildStep, NodeTest, Pattern, PatternNode, Predicate};
use crate::tree::{Grammar, RawKind};

/// Rule-group metadata stamped onto every pattern of one query source.
pub(super) struct RuleMeta<'a> {
    pub rule: usize,
    pub feature: &'a SmolStr,
    pub overrides: bool,
}

/// Parse every top-level pattern of `source`, numbering them from `first_index`.
pub(super) fn compile_source(
    grammar: &Grammar,
    source: &str,
    meta: RuleMeta<'_>,
    first_index: usize,
) -> Result<Vec<Pattern>, QueryError> {
    let mut parser = QueryParser {
        grammar,
        tokens: lex(source),
        pos: 0,
        rule: meta.rule,
        end: source.len(),
        captures: Vec::new(),
        predicates: Vec::new(),
    };

    let mut patterns = Vec::new();
    while !parser.at_end() {
        let offset = parser.offset();
        let root = parser.top_level()?;
        let predicates = std::mem::take(&mut parser.predicates);
        let specificity = root.specificity() + predicates.len() as u32;
        patterns.push(Pattern {
            index: first_index + patterns.len(),
            rule: meta.rule,
            feature: meta.feature.clone(),
            overrides: meta.overrides,
            offset,
            root,
            predicates,
            capture_names: std::mem::take(&mut parser.captures),
            specificity,
        });
    }
    Ok(patterns)
}

struct QueryParser<'q, 'g> {
    grammar: &'g Grammar,
    tokens: Vec<Lexed<'q>>,
    pos: usize,
    rule: usize,
    end: usize,
    captures: Vec<SmolStr>,
    predicates: Vec<Predicate>,
}

impl<'q> QueryParser<'q, '_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Lexed<'q>> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self, n: usize) -> Option<QueryToken> {
        self.tokens.get(self.pos + n).and_then(|t| t.token.ok())
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end, |t| t.span.start)
    }

    fn error(&self, reason: impl Into<String>) -> QueryError {
        QueryError::MalformedPattern {
            rule: self.rule,
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    /// Consume the next token, which must be `expected`.
    fn expect(&mut self, expected: QueryToken, what: &str) -> Result<&'q str, QueryError> {
        match self.peek() {
            Some(lexed) if lexed.token == Ok(expected) => {
                let text = lexed.text;
                self.pos += 1;
                Ok(text)
            }
            Some(lexed) if lexed.token.is_err() => {
                Err(self.error(format!("unexpected character `{}`", lexed.text)))
            }
            Some(lexed) => Err(self.error(format!("expected {what}, found `{}`", lexed.text))),
            None => Err(self.error(format!("expected {what}, found end of query"))),
        }
    }

    fn capture_id(&mut self, name: &str) -> CaptureId {
        match self.captures.iter().position(|c| c == name) {
            Some(id) => id,
            None => {
                self.captures.push(SmolStr::new(name));
                self.captures.len() - 1
            }
        }
    }

    fn trailing_captures(&mut self, node: &mut PatternNode) {
        while self.peek_token(0) == Some(QueryToken::Capture) {
            let text = self.tokens[self.pos].text;
            let id = self.capture_id(&text[1..]);
            node.captures.push(id);
            self.pos += 1;
        }
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    /// A top-level pattern, possibly a group `(pattern predicate*)`.
    fn top_level(&mut self) -> Result<PatternNode, QueryError> {
        let grouped = self.peek_token(0) == Some(QueryToken::LParen)
            && matches!(
                self.peek_token(1),
                Some(QueryToken::LParen | QueryToken::LBrack | QueryToken::String)
            );
        if !grouped {
            return self.pattern();
        }

        self.pos += 1;
        let mut node = self.pattern()?;
        while self.peek_token(0) == Some(QueryToken::LParen)
            && self.peek_token(1) == Some(QueryToken::Predicate)
        {
            self.predicate()?;
        }
        self.expect(QueryToken::RParen, "`)` closing the pattern group")?;
        self.trailing_captures(&mut node);
        Ok(node)
    }

    fn pattern(&mut self) -> Result<PatternNode, QueryError> {
        let Some(lexed) = self.peek() else {
            return Err(self.error("expected pattern, found end of query"));
        };
        let (text, token) = (lexed.text, lexed.token);
        let mut node = match token {
            Ok(QueryToken::LParen) => return self.node_pattern(),
            Ok(QueryToken::LBrack) => {
                self.pos += 1;
                let mut branches = Vec::new();
                while !matches!(self.peek_token(0), Some(QueryToken::RBrack) | None) {
                    branches.push(self.pattern()?);
                }
                if branches.is_empty() {
                    return Err(self.error("empty alternation"));
                }
                self.expect(QueryToken::RBrack, "`]`")?;
                PatternNode::new(NodeTest::Alternation(branches))
            }
            Ok(QueryToken::String) => {
                let literal = unquote(text);
                let kind = self
                    .grammar
                    .literal_kind(&literal)
                    .ok_or_else(|| self.error(format!("unknown token \"{literal}\"")))?;
                self.pos += 1;
                PatternNode::new(NodeTest::Kind(kind))
            }
            Ok(QueryToken::Ident) if text == "_" => {
                self.pos += 1;
                PatternNode::new(NodeTest::Any)
            }
            Err(()) => return Err(self.error(format!("unexpected character `{text}`"))),
            Ok(_) => return Err(self.error(format!("expected pattern, found `{text}`"))),
        };
        self.trailing_captures(&mut node);
        Ok(node)
    }

    /// `(kind item*) capture*`
    fn node_pattern(&mut self) -> Result<PatternNode, QueryError> {
        self.expect(QueryToken::LParen, "`(`")?;
        let name = self.expect(QueryToken::Ident, "node kind")?;
        let test = if name == "_" {
            NodeTest::AnyNamed
        } else {
            let kind = self
                .grammar
                .named_kind(name)
                .ok_or_else(|| self.error(format!("unknown node kind `{name}`")))?;
            NodeTest::Kind(kind)
        };
        let kind = match &test {
            NodeTest::Kind(kind) => Some(*kind),
            _ => None,
        };
        let mut node = PatternNode::new(test);

        let mut anchored = false;
        loop {
            match (self.peek_token(0), self.peek_token(1)) {
                (Some(QueryToken::RParen), _) => {
                    self.pos += 1;
                    break;
                }
                (Some(QueryToken::Dot), _) => {
                    self.pos += 1;
                    anchored = true;
                }
                (Some(QueryToken::LParen), Some(QueryToken::Predicate)) => self.predicate()?,
                (Some(QueryToken::Ident), Some(QueryToken::Colon)) => {
                    let field = self.field_name(kind)?;
                    let pattern = self.pattern()?;
                    node.children.push(ChildStep {
                        field: Some(field),
                        anchored: std::mem::take(&mut anchored),
                        pattern,
                    });
                }
                (None, _) if self.at_end() => {
                    return Err(self.error(format!("unclosed `({name}`")));
                }
                _ => {
                    let pattern = self.pattern()?;
                    node.children.push(ChildStep {
                        field: None,
                        anchored: std::mem::take(&mut anchored),
                        pattern,
                    });
                }
            }
        }
        node.anchor_end = anchored;
        self.trailing_captures(&mut node);
        Ok(node)
    }

    fn field_name(&mut self, parent: Option<RawKind>) -> Result<SmolStr, QueryError> {
        let field = self.tokens[self.pos].text;
        let known = match parent {
            Some(kind) => self.grammar.field_selector(kind, field).is_some(),
            None => self.grammar.has_field(field),
        };
        if !known {
            let reason = match parent {
                Some(kind) => format!(
                    "node kind `{}` has no field `{field}`",
                    self.grammar.kind_name(kind)
                ),
                None => format!("unknown field `{field}`"),
            };
            return Err(self.error(reason));
        }
        self.pos += 2;
        Ok(SmolStr::new(field))
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    fn predicate(&mut self) -> Result<(), QueryError> {
        self.expect(QueryToken::LParen, "`(`")?;
        let name = self.expect(QueryToken::Predicate, "predicate")?;
        let (capture, predicate_offset) = (self.predicate_capture()?, self.offset());

        let predicate = match name {
            "#eq?" | "#not-eq?" => {
                let negated = name == "#not-eq?";
                match self.peek_token(0) {
                    Some(QueryToken::Capture) => Predicate::EqCapture {
                        left: capture,
                        right: self.predicate_capture()?,
                        negated,
                    },
                    _ => Predicate::EqText {
                        capture,
                        text: self.string()?,
                        negated,
                    },
                }
            }
            "#match?" | "#not-match?" => {
                let source = self.string()?;
                let regex = Regex::new(&source).map_err(|err| QueryError::MalformedPattern {
                    rule: self.rule,
                    offset: predicate_offset,
                    reason: format!("invalid regex: {err}"),
                })?;
                Predicate::Match {
                    capture,
                    regex,
                    negated: name == "#not-match?",
                }
            }
            "#any-of?" => {
                let mut values = vec![self.string()?];
                while self.peek_token(0) == Some(QueryToken::String) {
                    values.push(self.string()?);
                }
                Predicate::AnyOf { capture, values }
            }
            other => return Err(self.error(format!("unknown predicate `{other}`"))),
        };

        self.expect(QueryToken::RParen, "`)` closing the predicate")?;
        self.predicates.push(predicate);
        Ok(())
    }

    /// A capture argument; it must name a capture already bound by the pattern.
    fn predicate_capture(&mut self) -> Result<CaptureId, QueryError> {
        let offset = self.offset();
        let text = self.expect(QueryToken::Capture, "capture")?;
        let name = &text[1..];
        self.captures
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| QueryError::MalformedPattern {
                rule: self.rule,
                offset,
                reason: format!("predicate refers to unknown capture `@{name}`"),
            })
    }

    fn string(&mut self) -> Result<String, QueryError> {
        self.expect(QueryToken::String, "string").map(unquote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax;

    fn compile(source: &str) -> Result<Vec<Pattern>, QueryError> {
        let feature = SmolStr::new_static("test");
        let meta = RuleMeta {
            rule: 0,
            feature: &feature,
            overrides: false,
        };
        compile_source(&syntax::grammar(), source, meta, 0)
    }

    fn reason(source: &str) -> String {
        match compile(source) {
            Err(QueryError::MalformedPattern { reason, .. }) => reason,
            Ok(_) => panic!("`{source}` compiled"),
        }
    }

    #[test]
    fn test_compiles_several_patterns() {
        let patterns = compile(
            r#"
            ; comments are ignored
            (line_comment) @comment
            ["constraint" "solve"] @keyword
            (call function: (identifier) @function)
            "#,
        )
        .unwrap();

        assert_eq!(patterns.len(), 3);
        assert_eq!(patterns[0].capture_names, vec![SmolStr::new("comment")]);
        assert_eq!(patterns[2].index, 2);
        assert!(patterns[1].offset < patterns[2].offset);
    }

    #[test]
    fn test_specificity_counts_constraints() {
        let patterns = compile(
            r#"
            (identifier) @variable
            (call function: (identifier) @function)
            ((identifier) @b (#match? @b "^int_"))
            (_) @any
            "#,
        )
        .unwrap();

        let specificity: Vec<_> = patterns.iter().map(|p| p.specificity).collect();
        assert_eq!(specificity, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_anchors_are_recorded() {
        let patterns = compile(r#"(array_literal . "[" (_) @first . "]" .)"#).unwrap();
        let root = &patterns[0].root;
        assert!(root.children[0].anchored);
        assert!(!root.children[1].anchored);
        assert!(root.children[2].anchored);
        assert!(root.anchor_end);
    }

    #[test]
    fn test_unknown_names_are_malformed() {
        assert_eq!(reason("(no_such_kind) @x"), "unknown node kind `no_such_kind`");
        assert_eq!(
            reason("(call callee: (identifier)) @x"),
            "node kind `call` has no field `callee`"
        );
        assert_eq!(reason("(_ bogus: (identifier))"), "unknown field `bogus`");
        assert_eq!(reason(r#""endwhile" @keyword"#), "unknown token \"endwhile\"");
    }

    #[test]
    fn test_bad_predicates_are_malformed() {
        assert_eq!(
            reason(r#"((identifier) @x (#frobnicate? @x "y"))"#),
            "unknown predicate `#frobnicate?`"
        );
        assert_eq!(
            reason(r#"((identifier) @x (#eq? @y "y"))"#),
            "predicate refers to unknown capture `@y`"
        );
        assert!(reason(r#"((identifier) @x (#match? @x "("))"#).starts_with("invalid regex"));
    }

    #[test]
    fn test_syntax_errors_report_offset() {
        let err = compile("(identifier) @x\n(call").unwrap_err();
        assert_eq!(
            err,
            QueryError::MalformedPattern {
                rule: 0,
                offset: 21,
                reason: "unclosed `(call`".to_string(),
            }
        );
        assert_eq!(reason("(identifier) $"), "unexpected character `$`");
        assert_eq!(reason("[]"), "empty alternation");
    }
}
