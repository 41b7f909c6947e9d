//! The MiniZinc grammar schema: query names and fields for every kind.

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::kind::SyntaxKind::{self, *};
use crate::tree::{FieldSelector, Grammar, GrammarBuilder};

static GRAMMAR: Lazy<Arc<Grammar>> = Lazy::new(|| Arc::new(build()));

/// The shared MiniZinc schema.
pub fn grammar() -> Arc<Grammar> {
    Arc::clone(&GRAMMAR)
}

const NAMED: &[(SyntaxKind, &str)] = &[
    (LINE_COMMENT, "line_comment"),
    (BLOCK_COMMENT, "block_comment"),
    (IDENT, "identifier"),
    (INT_NUMBER, "integer_literal"),
    (FLOAT_NUMBER, "float_literal"),
    (STRING, "string_literal"),
    (UNKNOWN, "unknown"),
    (SOURCE_FILE, "source_file"),
    (INCLUDE, "include"),
    (DECLARATION, "declaration"),
    (ASSIGNMENT, "assignment"),
    (CONSTRAINT, "constraint"),
    (SOLVE, "solve"),
    (OUTPUT, "output"),
    (PREDICATE, "predicate"),
    (FUNCTION, "function_item"),
    (ENUM, "enumeration"),
    (PARAMETERS, "parameters"),
    (PARAMETER, "parameter"),
    (TYPE_BASE, "type_base"),
    (ARRAY_TYPE, "array_type"),
    (ANNOTATION, "annotation"),
    (BINARY_OPERATION, "binary_operation"),
    (UNARY_OPERATION, "unary_operation"),
    (CALL, "call"),
    (GENERATOR_CALL, "generator_call"),
    (GENERATOR, "generator"),
    (INDEX_EXPRESSION, "index_expression"),
    (PARENTHESISED_EXPRESSION, "parenthesised_expression"),
    (ARRAY_LITERAL, "array_literal"),
    (ARRAY_LITERAL_2D, "array_literal_2d"),
    (ARRAY_LITERAL_2D_ROW, "array_literal_2d_row"),
    (ARRAY_COMPREHENSION, "array_comprehension"),
    (SET_LITERAL, "set_literal"),
    (SET_COMPREHENSION, "set_comprehension"),
    (IF_THEN_ELSE, "if_then_else"),
    (LET_EXPRESSION, "let_expression"),
    (BOOLEAN_LITERAL, "boolean_literal"),
    (ERROR, "ERROR"),
];

/// Anonymous tokens, named by their text.
pub(crate) const LITERALS: &[(SyntaxKind, &str)] = &[
    (ANN_KW, "ann"),
    (ANNOTATION_KW, "annotation"),
    (ARRAY_KW, "array"),
    (BOOL_KW, "bool"),
    (CONSTRAINT_KW, "constraint"),
    (DIFF_KW, "diff"),
    (DIV_KW, "div"),
    (ELSE_KW, "else"),
    (ELSEIF_KW, "elseif"),
    (ENDIF_KW, "endif"),
    (ENUM_KW, "enum"),
    (FALSE_KW, "false"),
    (FLOAT_KW, "float"),
    (FUNCTION_KW, "function"),
    (IF_KW, "if"),
    (IN_KW, "in"),
    (INCLUDE_KW, "include"),
    (INT_KW, "int"),
    (INTERSECT_KW, "intersect"),
    (LET_KW, "let"),
    (MAXIMIZE_KW, "maximize"),
    (MINIMIZE_KW, "minimize"),
    (MOD_KW, "mod"),
    (NOT_KW, "not"),
    (OF_KW, "of"),
    (OPT_KW, "opt"),
    (OUTPUT_KW, "output"),
    (PAR_KW, "par"),
    (PREDICATE_KW, "predicate"),
    (SATISFY_KW, "satisfy"),
    (SET_KW, "set"),
    (SOLVE_KW, "solve"),
    (STRING_KW, "string"),
    (SUBSET_KW, "subset"),
    (SUPERSET_KW, "superset"),
    (SYMDIFF_KW, "symdiff"),
    (TEST_KW, "test"),
    (THEN_KW, "then"),
    (TRUE_KW, "true"),
    (UNION_KW, "union"),
    (VAR_KW, "var"),
    (WHERE_KW, "where"),
    (XOR_KW, "xor"),
    (L_PAREN, "("),
    (R_PAREN, ")"),
    (L_BRACK, "["),
    (R_BRACK, "]"),
    (L_BRACE, "{"),
    (R_BRACE, "}"),
    (L_BRACK_PIPE, "[|"),
    (PIPE_R_BRACK, "|]"),
    (PIPE, "|"),
    (COMMA, ","),
    (SEMI, ";"),
    (COLON, ":"),
    (COLON2, "::"),
    (DOT2, ".."),
    (EQ, "="),
    (EQ2, "=="),
    (NEQ, "!="),
    (LT, "<"),
    (LTEQ, "<="),
    (GT, ">"),
    (GTEQ, ">="),
    (PLUS, "+"),
    (MINUS, "-"),
    (STAR, "*"),
    (SLASH, "/"),
    (CARET, "^"),
    (PLUS2, "++"),
    (IMPLIES, "->"),
    (RIMPLIES, "<-"),
    (EQUIV, "<->"),
    (AND, "/\\"),
    (OR, "\\/"),
];

fn build() -> Grammar {
    let mut builder = Grammar::builder("minizinc")
        .trivia(WHITESPACE.into(), "whitespace")
        .trivia(NEWLINE.into(), "newline");
    for &(kind, name) in NAMED {
        builder = builder.named(kind.into(), name);
    }
    for &(kind, text) in LITERALS {
        builder = builder.literal(kind.into(), text);
    }
    fields(builder).build()
}

fn fields(builder: GrammarBuilder) -> GrammarBuilder {
    use FieldSelector::*;

    builder
        .field(INCLUDE.into(), "file", Kind(STRING.into()))
        .field(DECLARATION.into(), "type", Before(COLON.into()))
        .field(DECLARATION.into(), "name", After(COLON.into()))
        .field(DECLARATION.into(), "annotation", Kind(ANNOTATION.into()))
        .field(DECLARATION.into(), "expr", After(EQ.into()))
        .field(ASSIGNMENT.into(), "name", Nth(0))
        .field(ASSIGNMENT.into(), "expr", After(EQ.into()))
        .field(CONSTRAINT.into(), "expr", Nth(1))
        .field(SOLVE.into(), "annotation", Kind(ANNOTATION.into()))
        .field(OUTPUT.into(), "expr", Nth(1))
        .field(PREDICATE.into(), "name", Before(PARAMETERS.into()))
        .field(PREDICATE.into(), "parameters", Kind(PARAMETERS.into()))
        .field(PREDICATE.into(), "body", After(EQ.into()))
        .field(FUNCTION.into(), "type", Nth(1))
        .field(FUNCTION.into(), "name", Before(PARAMETERS.into()))
        .field(FUNCTION.into(), "parameters", Kind(PARAMETERS.into()))
        .field(FUNCTION.into(), "body", After(EQ.into()))
        .field(ENUM.into(), "name", Nth(1))
        .field(ENUM.into(), "members", After(EQ.into()))
        .field(PARAMETER.into(), "type", Before(COLON.into()))
        .field(PARAMETER.into(), "name", After(COLON.into()))
        .field(ARRAY_TYPE.into(), "type", After(OF_KW.into()))
        .field(ANNOTATION.into(), "expr", Nth(1))
        .field(BINARY_OPERATION.into(), "left", Nth(0))
        .field(BINARY_OPERATION.into(), "operator", Nth(1))
        .field(BINARY_OPERATION.into(), "right", Nth(2))
        .field(UNARY_OPERATION.into(), "operator", Nth(0))
        .field(UNARY_OPERATION.into(), "operand", Nth(1))
        .field(CALL.into(), "function", Nth(0))
        .field(CALL.into(), "arguments", NamedFrom(1))
        .field(GENERATOR_CALL.into(), "function", Nth(0))
        .field(GENERATOR_CALL.into(), "generators", Kind(GENERATOR.into()))
        .field(GENERATOR_CALL.into(), "template", After(R_PAREN.into()))
        .field(GENERATOR.into(), "name", AllBefore(IN_KW.into()))
        .field(GENERATOR.into(), "collection", After(IN_KW.into()))
        .field(GENERATOR.into(), "where", After(WHERE_KW.into()))
        .field(INDEX_EXPRESSION.into(), "collection", Nth(0))
        .field(INDEX_EXPRESSION.into(), "indices", NamedFrom(1))
        .field(PARENTHESISED_EXPRESSION.into(), "expr", Nth(1))
        .field(ARRAY_LITERAL.into(), "member", NamedFrom(0))
        .field(ARRAY_LITERAL_2D.into(), "row", Kind(ARRAY_LITERAL_2D_ROW.into()))
        .field(ARRAY_LITERAL_2D_ROW.into(), "member", NamedFrom(0))
        .field(ARRAY_COMPREHENSION.into(), "template", Nth(1))
        .field(ARRAY_COMPREHENSION.into(), "generators", Kind(GENERATOR.into()))
        .field(SET_LITERAL.into(), "member", NamedFrom(0))
        .field(SET_COMPREHENSION.into(), "template", Nth(1))
        .field(SET_COMPREHENSION.into(), "generators", Kind(GENERATOR.into()))
        .field(IF_THEN_ELSE.into(), "condition", After(IF_KW.into()))
        .field(IF_THEN_ELSE.into(), "consequence", After(THEN_KW.into()))
        .field(IF_THEN_ELSE.into(), "alternative", After(ELSE_KW.into()))
        .field(LET_EXPRESSION.into(), "let", Kind(DECLARATION.into()))
        .field(LET_EXPRESSION.into(), "in", After(IN_KW.into()))
}
