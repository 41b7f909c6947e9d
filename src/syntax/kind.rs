//! MiniZinc syntax kinds.
//!
//! A single enum covers tokens (lexer output) and composite nodes (parser
//! output), following the rust-analyzer convention of SCREAMING_CASE variants.
//! Tokens come first, up to and including `EOF`.

use crate::tree::RawKind;

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Trivia ===
    WHITESPACE,
    NEWLINE,

    // === Named tokens ===
    LINE_COMMENT,
    BLOCK_COMMENT,
    IDENT,
    INT_NUMBER,
    FLOAT_NUMBER,
    STRING,
    UNKNOWN,

    // === Keywords ===
    ANN_KW,
    ANNOTATION_KW,
    ARRAY_KW,
    BOOL_KW,
    CONSTRAINT_KW,
    DIFF_KW,
    DIV_KW,
    ELSE_KW,
    ELSEIF_KW,
    ENDIF_KW,
    ENUM_KW,
    FALSE_KW,
    FLOAT_KW,
    FUNCTION_KW,
    IF_KW,
    IN_KW,
    INCLUDE_KW,
    INT_KW,
    INTERSECT_KW,
    LET_KW,
    MAXIMIZE_KW,
    MINIMIZE_KW,
    MOD_KW,
    NOT_KW,
    OF_KW,
    OPT_KW,
    OUTPUT_KW,
    PAR_KW,
    PREDICATE_KW,
    SATISFY_KW,
    SET_KW,
    SOLVE_KW,
    STRING_KW,
    SUBSET_KW,
    SUPERSET_KW,
    SYMDIFF_KW,
    TEST_KW,
    THEN_KW,
    TRUE_KW,
    UNION_KW,
    VAR_KW,
    WHERE_KW,
    XOR_KW,

    // === Punctuation and operators ===
    L_PAREN,
    R_PAREN,
    L_BRACK,
    R_BRACK,
    L_BRACE,
    R_BRACE,
    /// `[|` opening a two-dimensional array literal
    L_BRACK_PIPE,
    /// `|]` closing a two-dimensional array literal
    PIPE_R_BRACK,
    PIPE,
    COMMA,
    SEMI,
    COLON,
    COLON2,
    DOT2,
    EQ,
    EQ2,
    NEQ,
    LT,
    LTEQ,
    GT,
    GTEQ,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    CARET,
    PLUS2,
    IMPLIES,
    RIMPLIES,
    EQUIV,
    AND,
    OR,

    /// End of input; never stored in a tree
    EOF,

    // === Nodes ===
    SOURCE_FILE,
    INCLUDE,
    DECLARATION,
    ASSIGNMENT,
    CONSTRAINT,
    SOLVE,
    OUTPUT,
    PREDICATE,
    FUNCTION,
    ENUM,
    PARAMETERS,
    PARAMETER,
    TYPE_BASE,
    ARRAY_TYPE,
    ANNOTATION,
    BINARY_OPERATION,
    UNARY_OPERATION,
    CALL,
    GENERATOR_CALL,
    GENERATOR,
    INDEX_EXPRESSION,
    PARENTHESISED_EXPRESSION,
    ARRAY_LITERAL,
    ARRAY_LITERAL_2D,
    ARRAY_LITERAL_2D_ROW,
    ARRAY_COMPREHENSION,
    SET_LITERAL,
    SET_COMPREHENSION,
    IF_THEN_ELSE,
    LET_EXPRESSION,
    BOOLEAN_LITERAL,
    ERROR,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | NEWLINE)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, LINE_COMMENT | BLOCK_COMMENT)
    }

    pub fn is_token(self) -> bool {
        self <= EOF
    }

    pub fn is_keyword(self) -> bool {
        (ANN_KW..=XOR_KW).contains(&self)
    }
}

impl From<SyntaxKind> for RawKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

impl PartialEq<SyntaxKind> for RawKind {
    fn eq(&self, other: &SyntaxKind) -> bool {
        self.0 == *other as u16
    }
}
