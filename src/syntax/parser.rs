//! Resilient recursive-descent parser for MiniZinc.
//!
//! The parser never fails: it always produces a tree, wrapping anything it
//! cannot place in `ERROR` nodes and recording a [`SyntaxError`].
//!
//! Trivia (whitespace, newlines) and comments are attached lazily: they are
//! flushed into whatever node is open when the next real token is consumed or
//! the next node starts. Nodes therefore never begin or end with trivia, which
//! keeps node start columns meaningful for indentation.
//!
//! Binary operators, from weakest to strongest:
//!
//! ```text
//! <->
//! -> <-
//! \/ xor
//! /\
//! < > <= >= == = !=
//! in subset superset
//! union diff symdiff
//! ..
//! + -
//! * / div mod intersect
//! ^
//! ++                         (right associative)
//! ```
//!
//! Prefix `not`, `-` and `+` bind tighter than every binary operator.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::kind::SyntaxKind::{self, *};
use super::lexer::{Lexeme, lex};
use crate::base::{TextRange, TextSize};
use crate::tree::SyntaxError;

/// Stack depth limit for nested expressions and types.
const MAX_DEPTH: u32 = 256;

const PREFIX_BP: u8 = 25;

/// Tokens that end an expression when no expression could be parsed.
const RECOVERY: &[SyntaxKind] = &[
    SEMI,
    COMMA,
    R_PAREN,
    R_BRACK,
    R_BRACE,
    PIPE,
    PIPE_R_BRACK,
    THEN_KW,
    ELSE_KW,
    ELSEIF_KW,
    ENDIF_KW,
    IN_KW,
    WHERE_KW,
    EOF,
];

/// Green tree and errors for one parse.
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

pub fn parse(source: &str) -> Parse {
    let mut parser = Parser::new(source, lex(source));
    parser.source_file();
    parser.finish()
}

struct Parser<'t> {
    tokens: Vec<Lexeme<'t>>,
    pos: usize,
    len: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    depth: u32,
    /// For each opening bracket token, the index of the token that closes it.
    closing: Vec<Option<usize>>,
}

/// Pair every opening bracket with the next unmatched closing bracket of any
/// kind. A `;` abandons the brackets still open before it.
fn match_brackets(tokens: &[Lexeme<'_>]) -> Vec<Option<usize>> {
    let mut closing = vec![None; tokens.len()];
    let mut open = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            L_PAREN | L_BRACK | L_BRACE | L_BRACK_PIPE => open.push(index),
            R_PAREN | R_BRACK | R_BRACE | PIPE_R_BRACK => {
                if let Some(start) = open.pop() {
                    closing[start] = Some(index);
                }
            }
            SEMI => open.clear(),
            _ => {}
        }
    }
    closing
}

fn infix_bp(kind: SyntaxKind) -> Option<(u8, u8)> {
    let bp = match kind {
        EQUIV => (1, 2),
        IMPLIES | RIMPLIES => (3, 4),
        OR | XOR_KW => (5, 6),
        AND => (7, 8),
        LT | GT | LTEQ | GTEQ | EQ2 | EQ | NEQ => (9, 10),
        IN_KW | SUBSET_KW | SUPERSET_KW => (11, 12),
        UNION_KW | DIFF_KW | SYMDIFF_KW => (13, 14),
        DOT2 => (15, 16),
        PLUS | MINUS => (17, 18),
        STAR | SLASH | DIV_KW | MOD_KW | INTERSECT_KW => (19, 20),
        CARET => (21, 22),
        PLUS2 => (24, 23),
        _ => return None,
    };
    Some(bp)
}

impl<'t> Parser<'t> {
    fn new(source: &'t str, tokens: Vec<Lexeme<'t>>) -> Self {
        Self {
            closing: match_brackets(&tokens),
            tokens,
            pos: 0,
            len: TextSize::of(source),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            depth: 0,
        }
    }

    fn finish(mut self) -> Parse {
        // Trailing trivia belongs to the root, which is still open here.
        self.flush_trivia();
        self.builder.finish_node();
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn is_skipped(kind: SyntaxKind) -> bool {
        kind.is_trivia() || kind.is_comment()
    }

    /// Kind of the nth significant token ahead.
    fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !Self::is_skipped(t.kind))
            .nth(n)
            .map_or(EOF, |t| t.kind)
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Range of the current significant token, or an empty range at the end.
    fn current_range(&self) -> TextRange {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !Self::is_skipped(t.kind))
            .map_or(TextRange::empty(self.len), |t| t.range)
    }

    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !Self::is_skipped(token.kind) {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {}", describe(kind)));
        false
    }

    fn start(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(SyntaxError::new(range, message.into()));
    }

    /// Record an error and wrap the current token in an `ERROR` node.
    fn error_and_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        if !self.at(EOF) {
            self.start(ERROR);
            self.bump();
            self.finish_node();
        }
    }

    /// Parse `item (, item)*` up to `close`, allowing a trailing comma.
    fn comma_list(&mut self, close: SyntaxKind, mut item: impl FnMut(&mut Self)) {
        loop {
            if self.at(close) || self.at(EOF) {
                break;
            }
            item(self);
            if !self.eat(COMMA) {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    fn source_file(&mut self) {
        self.builder.start_node(SOURCE_FILE.into());
        while !self.at(EOF) {
            let before = self.pos;
            self.item();
            if self.pos == before {
                self.error_and_bump("expected item");
            }
        }
    }

    fn item(&mut self) {
        match self.current() {
            INCLUDE_KW => {
                self.start(INCLUDE);
                self.bump();
                self.expect(STRING);
                self.expect(SEMI);
                self.finish_node();
            }
            CONSTRAINT_KW => {
                self.constraint();
                self.expect(SEMI);
                self.finish_node();
            }
            SOLVE_KW => self.solve(),
            OUTPUT_KW => {
                self.start(OUTPUT);
                self.bump();
                self.expr();
                self.expect(SEMI);
                self.finish_node();
            }
            PREDICATE_KW | TEST_KW => {
                self.start(PREDICATE);
                self.bump();
                self.expect(IDENT);
                self.callable_rest();
            }
            FUNCTION_KW => {
                self.start(FUNCTION);
                self.bump();
                self.type_inst();
                self.expect(COLON);
                self.expect(IDENT);
                self.callable_rest();
            }
            ENUM_KW => {
                self.start(ENUM);
                self.bump();
                self.expect(IDENT);
                self.annotations();
                if self.eat(EQ) {
                    self.expr();
                }
                self.expect(SEMI);
                self.finish_node();
            }
            IDENT if self.nth(1) == EQ => {
                self.start(ASSIGNMENT);
                self.bump();
                self.bump();
                self.expr();
                self.expect(SEMI);
                self.finish_node();
            }
            _ if self.at_type_start() => {
                self.declaration();
                self.expect(SEMI);
                self.finish_node();
            }
            _ => self.error_and_bump("expected item"),
        }
    }

    fn at_type_start(&self) -> bool {
        self.at_any(&[
            VAR_KW,
            PAR_KW,
            OPT_KW,
            SET_KW,
            ARRAY_KW,
            INT_KW,
            FLOAT_KW,
            BOOL_KW,
            STRING_KW,
            ANN_KW,
            IDENT,
            INT_NUMBER,
            FLOAT_NUMBER,
            MINUS,
            L_BRACE,
            L_PAREN,
        ])
    }

    /// Opens a `CONSTRAINT` node and leaves it open for the terminator.
    fn constraint(&mut self) {
        self.start(CONSTRAINT);
        self.bump();
        self.expr();
        self.annotations();
    }

    /// Opens a `DECLARATION` node and leaves it open for the terminator.
    fn declaration(&mut self) {
        self.start(DECLARATION);
        self.type_inst();
        self.expect(COLON);
        self.expect(IDENT);
        self.annotations();
        if self.eat(EQ) {
            self.expr();
        }
    }

    fn solve(&mut self) {
        self.start(SOLVE);
        self.bump();
        self.annotations();
        match self.current() {
            SATISFY_KW => self.bump(),
            MINIMIZE_KW | MAXIMIZE_KW => {
                self.bump();
                self.expr();
            }
            _ => self.error("expected `satisfy`, `minimize` or `maximize`"),
        }
        self.expect(SEMI);
        self.finish_node();
    }

    /// Parameters, annotations, optional body and `;` of a predicate or function.
    fn callable_rest(&mut self) {
        if self.at(L_PAREN) {
            self.start(PARAMETERS);
            self.bump();
            self.comma_list(R_PAREN, |p| {
                p.start(PARAMETER);
                p.type_inst();
                p.expect(COLON);
                p.expect(IDENT);
                p.finish_node();
            });
            self.expect(R_PAREN);
            self.finish_node();
        }
        self.annotations();
        if self.eat(EQ) {
            self.expr();
        }
        self.expect(SEMI);
        self.finish_node();
    }

    fn annotations(&mut self) {
        while self.at(COLON2) {
            self.start(ANNOTATION);
            self.bump();
            if !self.expr_bp(PREFIX_BP) {
                self.error("expected annotation");
            }
            self.finish_node();
        }
    }

    fn type_inst(&mut self) {
        if self.depth >= MAX_DEPTH {
            self.error("type nested too deeply");
            return;
        }
        self.depth += 1;
        self.type_inst_inner();
        self.depth -= 1;
    }

    fn type_inst_inner(&mut self) {
        if self.at(ARRAY_KW) {
            self.start(ARRAY_TYPE);
            self.bump();
            self.expect(L_BRACK);
            self.comma_list(R_BRACK, Self::type_inst);
            self.expect(R_BRACK);
            self.expect(OF_KW);
            self.type_inst();
            self.finish_node();
            return;
        }

        self.start(TYPE_BASE);
        let _ = self.eat(VAR_KW) || self.eat(PAR_KW);
        self.eat(OPT_KW);
        if self.eat(SET_KW) {
            self.expect(OF_KW);
        }
        match self.current() {
            INT_KW | FLOAT_KW | BOOL_KW | STRING_KW | ANN_KW => self.bump(),
            _ => {
                // Range and set types: `1..n`, `{1, 3}`, `Color`
                if !self.expr_bp(13) {
                    self.error("expected type");
                }
            }
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) {
        if !self.expr_bp(0) {
            if self.at_any(RECOVERY) {
                self.error("expected expression");
            } else {
                self.error_and_bump("expected expression");
            }
        }
    }

    /// Returns false when no expression starts at the current token.
    fn expr_bp(&mut self, min_bp: u8) -> bool {
        if self.depth >= MAX_DEPTH {
            self.error("expression nested too deeply");
            return false;
        }
        self.depth += 1;
        let parsed = self.expr_bp_inner(min_bp);
        self.depth -= 1;
        parsed
    }

    fn expr_bp_inner(&mut self, min_bp: u8) -> bool {
        let checkpoint = self.checkpoint();

        if self.at_any(&[NOT_KW, MINUS, PLUS]) {
            self.start(UNARY_OPERATION);
            self.bump();
            if !self.expr_bp(PREFIX_BP) {
                self.error("expected operand");
            }
            self.finish_node();
        } else {
            if !self.primary() {
                return false;
            }
            while self.at(L_BRACK) {
                self.start_at(checkpoint, INDEX_EXPRESSION);
                self.bump();
                self.comma_list(R_BRACK, Self::expr);
                self.expect(R_BRACK);
                self.finish_node();
            }
        }

        loop {
            let Some((left_bp, right_bp)) = infix_bp(self.current()) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            self.start_at(checkpoint, BINARY_OPERATION);
            self.bump();
            if !self.expr_bp(right_bp) {
                self.error("expected right operand");
            }
            self.finish_node();
        }
        true
    }

    fn primary(&mut self) -> bool {
        match self.current() {
            INT_NUMBER | FLOAT_NUMBER | STRING => self.bump(),
            TRUE_KW | FALSE_KW => {
                self.start(BOOLEAN_LITERAL);
                self.bump();
                self.finish_node();
            }
            IDENT if self.nth(1) == L_PAREN => {
                if self.at_generator_call() {
                    self.generator_call();
                } else {
                    self.start(CALL);
                    self.bump();
                    self.bump();
                    self.comma_list(R_PAREN, Self::expr);
                    self.expect(R_PAREN);
                    self.finish_node();
                }
            }
            IDENT => self.bump(),
            L_PAREN => {
                self.start(PARENTHESISED_EXPRESSION);
                self.bump();
                self.expr();
                self.expect(R_PAREN);
                self.finish_node();
            }
            L_BRACK => self.bracketed(R_BRACK, ARRAY_LITERAL, ARRAY_COMPREHENSION),
            L_BRACE => self.bracketed(R_BRACE, SET_LITERAL, SET_COMPREHENSION),
            L_BRACK_PIPE => self.array_2d(),
            IF_KW => self.if_then_else(),
            LET_KW => self.let_expression(),
            _ => return false,
        }
        true
    }

    /// `f(i in S)(e)`: the parenthesised list is followed by another `(`.
    fn at_generator_call(&self) -> bool {
        let Some(open) = self.significant_from(self.pos).nth(1) else {
            return false;
        };
        if self.tokens[open].kind != L_PAREN {
            return false;
        }
        let Some(close) = self.closing[open] else {
            return false;
        };
        self.significant_from(close + 1)
            .next()
            .is_some_and(|index| self.tokens[index].kind == L_PAREN)
    }

    /// Indices of the significant tokens at or after `start`.
    fn significant_from(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        (start..self.tokens.len()).filter(move |&index| !Self::is_skipped(self.tokens[index].kind))
    }

    fn generator_call(&mut self) {
        self.start(GENERATOR_CALL);
        self.bump();
        self.bump();
        self.generators();
        self.expect(R_PAREN);
        self.expect(L_PAREN);
        self.expr();
        self.expect(R_PAREN);
        self.finish_node();
    }

    fn generators(&mut self) {
        loop {
            self.start(GENERATOR);
            self.expect(IDENT);
            while self.at(COMMA) && self.nth(1) == IDENT && matches!(self.nth(2), COMMA | IN_KW) {
                self.bump();
                self.bump();
            }
            self.expect(IN_KW);
            self.expr();
            if self.eat(WHERE_KW) {
                self.expr();
            }
            self.finish_node();
            if !self.eat(COMMA) {
                break;
            }
        }
    }

    /// Array or set literal, or the matching comprehension.
    fn bracketed(&mut self, close: SyntaxKind, literal: SyntaxKind, comprehension: SyntaxKind) {
        let checkpoint = self.checkpoint();
        self.bump();
        if self.eat(close) {
            self.start_at(checkpoint, literal);
            self.finish_node();
            return;
        }

        self.expr();
        if self.at(PIPE) {
            self.start_at(checkpoint, comprehension);
            self.bump();
            self.generators();
        } else {
            self.start_at(checkpoint, literal);
            while self.eat(COMMA) {
                if self.at(close) {
                    break;
                }
                self.expr();
            }
        }
        self.expect(close);
        self.finish_node();
    }

    /// `[| a, b | c, d |]`: rows separated by `|`.
    fn array_2d(&mut self) {
        self.start(ARRAY_LITERAL_2D);
        self.bump();
        loop {
            if self.at(PIPE_R_BRACK) || self.at(EOF) {
                break;
            }
            self.start(ARRAY_LITERAL_2D_ROW);
            self.expr();
            while self.eat(COMMA) {
                if self.at_any(&[PIPE, PIPE_R_BRACK]) {
                    break;
                }
                self.expr();
            }
            self.finish_node();
            if !self.eat(PIPE) {
                break;
            }
        }
        self.expect(PIPE_R_BRACK);
        self.finish_node();
    }

    fn if_then_else(&mut self) {
        self.start(IF_THEN_ELSE);
        self.bump();
        self.expr();
        self.expect(THEN_KW);
        self.expr();
        while self.eat(ELSEIF_KW) {
            self.expr();
            self.expect(THEN_KW);
            self.expr();
        }
        if self.eat(ELSE_KW) {
            self.expr();
        }
        self.expect(ENDIF_KW);
        self.finish_node();
    }

    fn let_expression(&mut self) {
        self.start(LET_EXPRESSION);
        self.bump();
        self.expect(L_BRACE);
        loop {
            if self.at(R_BRACE) || self.at(EOF) {
                break;
            }
            if self.at(CONSTRAINT_KW) {
                self.constraint();
            } else {
                self.declaration();
            }
            self.finish_node();
            if !(self.eat(SEMI) || self.eat(COMMA)) {
                break;
            }
        }
        self.expect(R_BRACE);
        self.expect(IN_KW);
        self.expr();
        self.finish_node();
    }
}

fn describe(kind: SyntaxKind) -> String {
    super::schema::LITERALS
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or_else(|| format!("{kind:?}").to_lowercase(), |(_, text)| format!("`{text}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::MiniZinc;
    use crate::tree::GrammarProvider;

    fn dump(source: &str) -> String {
        MiniZinc.parse(source).debug_dump()
    }

    fn errors(source: &str) -> Vec<String> {
        parse(source)
            .errors
            .iter()
            .map(|e| e.message.to_string())
            .collect()
    }

    #[test]
    fn test_lossless_round_trip() {
        let source = "int: n = 3; % size\n\
                      array[1..n] of var 1..n: q;\n\
                      constraint forall(i in 1..n)(q[i] != 0);\n\
                      solve satisfy;\n";
        let tree = MiniZinc.parse(source);
        assert_eq!(tree.root().text(), source);
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
    }

    #[test]
    fn test_declaration_shape() {
        let out = dump("var int: x = 3;");
        assert!(out.contains("declaration@0..15"), "{out}");
        assert!(out.contains("type_base@0..7"), "{out}");
        assert!(out.contains("integer_literal@13..14"), "{out}");
    }

    #[test]
    fn test_binary_precedence() {
        let tree = MiniZinc.parse("constraint a + b * c < d;");
        let constraint = tree.root().children().remove(0);
        let expr = constraint.field("expr").remove(0);
        assert_eq!(expr.kind_name(), "binary_operation");
        assert_eq!(expr.field("operator")[0].text(), "<");
        let left = expr.field("left").remove(0);
        assert_eq!(left.text(), "a + b * c");
        assert_eq!(left.field("right")[0].text(), "b * c");
    }

    #[test]
    fn test_two_dimensional_literal() {
        let out = dump("x = [| 1, 2\n     | 3, 4 |];");
        assert!(out.contains("array_literal_2d@4..26"), "{out}");
        assert!(out.contains("array_literal_2d_row@7..11"), "{out}");
        assert!(out.contains("|@17..18"), "{out}");
    }

    #[test]
    fn test_generator_call_and_comprehension() {
        let out = dump(
            "constraint forall(i, j in S where i < j)(x[i] != x[j]);\nx = [i | i in 1..3];",
        );
        assert!(out.contains("generator_call"), "{out}");
        assert!(out.contains("array_comprehension"), "{out}");
        assert!(!out.contains("ERROR"), "{out}");
    }

    #[test]
    fn test_plain_call_is_not_generator_call() {
        let out = dump("constraint alldifferent(x) /\\ (y > 0);");
        assert!(out.contains("call@"), "{out}");
        assert!(!out.contains("generator_call"), "{out}");
    }

    #[test]
    fn test_if_and_let() {
        let source = "y = if a then let { int: k = 2; } in k else 0 endif;";
        assert!(errors(source).is_empty(), "{:?}", errors(source));
        let out = dump(source);
        assert!(out.contains("if_then_else"));
        assert!(out.contains("let_expression"));
    }

    #[test]
    fn test_predicate_with_parameters() {
        let source = "predicate no_overlap(var int: s1, int: d1) = s1 + d1 > 0;";
        assert!(errors(source).is_empty(), "{:?}", errors(source));
        let tree = MiniZinc.parse(source);
        let predicate = tree.root().children().remove(0);
        assert_eq!(predicate.field("name")[0].text(), "no_overlap");
        assert_eq!(predicate.field("parameters")[0].named_children().len(), 2);
    }

    #[test]
    fn test_solve_with_annotation() {
        let source = "solve :: int_search(q, input_order, indomain_min) minimize cost;";
        assert!(errors(source).is_empty(), "{:?}", errors(source));
        assert!(dump(source).contains("annotation@"));
    }

    #[test]
    fn test_recovers_from_garbage() {
        let source = "constraint x < ;\n$ int: y;";
        let tree = MiniZinc.parse(source);
        assert_eq!(tree.root().text(), source);
        assert!(!tree.errors().is_empty());
        let out = tree.debug_dump();
        assert!(out.contains("ERROR"), "{out}");
        assert!(out.contains("error 1:"), "{out}");
    }

    #[test]
    fn test_unterminated_input_terminates() {
        for source in ["x = [| 1, 2", "constraint forall(", "let {", "(((", "array[", "solve"] {
            let tree = MiniZinc.parse(source);
            assert_eq!(tree.root().text(), source);
        }
    }

    #[test]
    fn test_deeply_nested_array_types_terminate() {
        let source = "array[".repeat(20_000);
        let tree = MiniZinc.parse(&source);
        assert_eq!(tree.root().text(), source);
        assert!(
            tree.errors()
                .iter()
                .any(|e| &*e.message == "type nested too deeply")
        );
    }

    #[test]
    fn test_nested_calls_pair_their_own_parentheses() {
        let nested = format!("{}x{}", "f(".repeat(100), ")".repeat(100));
        let out = dump(&format!("constraint forall(i in {nested})(y);"));
        assert_eq!(out.matches("generator_call@").count(), 1, "{out}");
        assert!(!out.contains("ERROR"), "{out}");

        let out = dump(&format!("constraint {nested};"));
        assert!(!out.contains("generator_call"), "{out}");
        assert!(!out.contains("ERROR"), "{out}");
    }

    #[test]
    fn test_semicolon_abandons_open_brackets() {
        assert_eq!(match_brackets(&lex("f(a; b)(c)")).iter().flatten().count(), 1);
        let out = dump("constraint f(a; b)(c);");
        assert!(!out.contains("generator_call"), "{out}");
    }
}
