//! The built-in MiniZinc highlighting rule table.

use crate::query::QueryRule;

const COMMENT: &str = r#"
[(line_comment) (block_comment)] @comment
"#;

const DEFINITION: &str = r#"
(declaration name: (identifier) @variable.definition)
(predicate name: (identifier) @function.definition)
(function_item name: (identifier) @function.definition)
(enumeration name: (identifier) @type.definition)
(parameter name: (identifier) @variable.parameter)
(generator name: (identifier) @variable.definition)
"#;

const KEYWORD: &str = r#"
[
  "ann" "annotation" "constraint" "else" "elseif" "endif" "enum" "function"
  "if" "in" "include" "let" "maximize" "minimize" "of" "output" "predicate"
  "satisfy" "solve" "test" "then" "where"
  "array" "opt" "par" "set" "var"
  "diff" "div" "intersect" "mod" "not" "subset" "superset" "symdiff" "union" "xor"
] @keyword
"#;

const STRING: &str = r#"
(string_literal) @string
"#;

const TYPE: &str = r#"
["int" "float" "bool" "string"] @type.builtin
(type_base (identifier) @type)
"#;

const BUILTIN: &str = r#"
((call function: (identifier) @function.builtin)
  (#any-of? @function.builtin
    "abs" "alldifferent" "all_different" "array1d" "array2d" "bool2int" "card"
    "ceil" "exp" "fix" "floor" "index_set" "int2float" "length" "ln" "log"
    "max" "min" "pow" "round" "show" "sqrt"))
((generator_call function: (identifier) @function.builtin)
  (#any-of? @function.builtin "forall" "exists" "sum" "product" "min" "max"))
"#;

const CONSTANT: &str = r#"
(boolean_literal) @constant.builtin
"#;

const NUMBER: &str = r#"
[(integer_literal) (float_literal)] @number
"#;

const ANNOTATION: &str = r#"
(annotation) @attribute
"#;

const BRACKET: &str = r#"
["(" ")" "[" "]" "{" "}" "[|" "|]"] @punctuation.bracket
"#;

const DELIMITER: &str = r#"
["," ";" ":" "|"] @punctuation.delimiter
"#;

const FUNCTION: &str = r#"
(call function: (identifier) @function.call)
(generator_call function: (identifier) @function.call)
"#;

const OPERATOR: &str = r#"
[
  "=" "==" "!=" "<" "<=" ">" ">=" "+" "-" "*" "/" "^" "++"
  "->" "<-" "<->" "/\\" "\\/" ".."
] @operator
"#;

const VARIABLE: &str = r#"
(identifier) @variable
"#;

/// Rule groups in table order, one per feature.
pub fn minizinc_rules() -> Vec<QueryRule> {
    [
        ("comment", COMMENT),
        ("definition", DEFINITION),
        ("keyword", KEYWORD),
        ("string", STRING),
        ("type", TYPE),
        ("builtin", BUILTIN),
        ("constant", CONSTANT),
        ("number", NUMBER),
        ("annotation", ANNOTATION),
        ("bracket", BRACKET),
        ("delimiter", DELIMITER),
        ("function", FUNCTION),
        ("operator", OPERATOR),
        ("variable", VARIABLE),
    ]
    .into_iter()
    .map(|(feature, query)| QueryRule::new(feature, query))
    .collect()
}
