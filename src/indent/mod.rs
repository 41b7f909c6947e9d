//! Indentation: an ordered decision list over (node, parent, grandparent).
//!
//! Rules are tried in table order and the first match picks an anchor and
//! an offset. The table always ends with the catch-all rule, so every node
//! gets a column:
//!
//! ```text
//! node     parent            grandparent   anchor      offset
//! "|"      array_literal_2d  any           parent      1 column
//! ...
//! any      any               any           parent-bol  1 unit
//! ```

mod resolve;
mod rule;

use thiserror::Error;

pub use resolve::IndentRules;
pub use rule::{Anchor, IndentRule, NodeMatcher, Offset};

/// Indent unit of the built-in MiniZinc table.
pub const DEFAULT_UNIT: u32 = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndentError {
    #[error("malformed indent rule {index}: {reason}")]
    MalformedRule { index: usize, reason: String },
}

/// The built-in MiniZinc indentation table.
pub fn minizinc_rules() -> Vec<IndentRule> {
    use Anchor::*;
    use NodeMatcher::Any;

    vec![
        IndentRule::new(NodeMatcher::one_of([")", "]", "}"]), Any, ParentBol, Offset::Columns(0)),
        IndentRule::new(NodeMatcher::kind("|]"), Any, Parent, Offset::Columns(0)),
        // 2D array rows line up one column past `[|`
        IndentRule::new(
            NodeMatcher::kind("|"),
            NodeMatcher::kind("array_literal_2d"),
            Parent,
            Offset::Columns(1),
        ),
        IndentRule::new(Any, NodeMatcher::kind("source_file"), Parent, Offset::Columns(0)),
        IndentRule::new(
            NodeMatcher::one_of(["then", "elseif", "else", "endif"]),
            NodeMatcher::kind("if_then_else"),
            ParentBol,
            Offset::Columns(0),
        ),
        IndentRule::new(
            NodeMatcher::kind("in"),
            NodeMatcher::kind("let_expression"),
            ParentBol,
            Offset::Columns(0),
        ),
        IndentRule::catch_all(),
    ]
}

/// The built-in table compiled against the MiniZinc grammar.
pub fn minizinc() -> Result<IndentRules, IndentError> {
    IndentRules::compile(&crate::syntax::grammar(), &minizinc_rules(), DEFAULT_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::MiniZinc;
    use crate::tree::GrammarProvider;

    fn columns(source: &str) -> Vec<u32> {
        let rules = minizinc().unwrap();
        let tree = MiniZinc.parse(source);
        (0..tree.line_index().len() as u32)
            .map(|line| rules.indent_for_line(&tree, line).unwrap())
            .collect()
    }

    #[test]
    fn test_two_dimensional_rows_align() {
        assert_eq!(columns("x = [| 1, 2\n| 3, 4 |];"), vec![0, 5]);
        assert_eq!(columns("x = [| 1, 2\n     | 3, 4\n|];"), vec![0, 5, 4]);
    }

    #[test]
    fn test_brackets_close_at_parent_line() {
        assert_eq!(
            columns("constraint forall(\ni in 1..n\n)(\nx[i] > 0\n);"),
            vec![0, 2, 0, 2, 0]
        );
    }

    #[test]
    fn test_if_then_else_keywords() {
        assert_eq!(
            columns("y = if a\nthen b\nelse c\nendif;"),
            vec![0, 0, 0, 0]
        );
        assert_eq!(
            columns("constraint\n  if a then b\n  else c endif;"),
            vec![0, 2, 2]
        );
    }

    #[test]
    fn test_let_in() {
        assert_eq!(
            columns("y = let {\nint: k = 2;\n} in k;"),
            vec![0, 2, 0]
        );
        assert_eq!(columns("y = let { int: k = 2; }\nin k;"), vec![0, 0]);
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(columns("int: x;\n\nint: y;"), vec![0, 0, 0]);
        assert_eq!(columns("x = [\n\n1];"), vec![0, 2, 2]);
        assert_eq!(columns("x = [\r\n\r\n1];"), vec![0, 2, 2]);
    }

    #[test]
    fn test_lines_inside_block_comment_keep_their_indentation() {
        let rules = minizinc().unwrap();
        let tree = MiniZinc.parse("/* a\n   \n b */\nint: x;");
        assert_eq!(rules.indent_for_line(&tree, 1), Some(3));
        assert_eq!(rules.indent_for_line(&tree, 2), Some(1));
        assert_eq!(rules.indent_for_line(&tree, 3), Some(0));
    }
}
