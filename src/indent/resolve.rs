//! Rule validation and the first-match indentation computation.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::IndentError;
use super::rule::{Anchor, IndentRule, NodeMatcher, Offset};
use crate::base::{TextRange, TextSize};
use crate::tree::{Grammar, Node, RawKind, Tree};

#[derive(Clone, Debug)]
enum Matcher {
    Any,
    Kinds(FxHashSet<RawKind>),
    Field(SmolStr),
    AfterSibling(FxHashSet<RawKind>),
}

impl Matcher {
    fn matches(&self, node: Option<&Node<'_>>) -> bool {
        match (self, node) {
            (Matcher::Any, _) => true,
            (_, None) => false,
            (Matcher::Kinds(kinds), Some(node)) => kinds.contains(&node.kind()),
            (Matcher::Field(field), Some(node)) => node.field_name() == Some(field.as_str()),
            (Matcher::AfterSibling(kinds), Some(node)) => node
                .prev_sibling()
                .is_some_and(|sibling| kinds.contains(&sibling.kind())),
        }
    }
}

#[derive(Clone, Debug)]
struct CompiledRule {
    node: Matcher,
    parent: Matcher,
    grandparent: Matcher,
    anchor: Anchor,
    offset: Offset,
}

/// A validated indentation rule table.
#[derive(Clone, Debug)]
pub struct IndentRules {
    rules: Vec<CompiledRule>,
    unit: u32,
}

impl IndentRules {
    /// Validate `rules` against `grammar`.
    ///
    /// Every kind and field must exist, and the table must end with
    /// [`IndentRule::catch_all`] and contain no other unconditional rule.
    pub fn compile(
        grammar: &Grammar,
        rules: &[IndentRule],
        unit: u32,
    ) -> Result<Self, IndentError> {
        let last = rules.len().checked_sub(1);
        if last.is_none_or(|i| rules[i] != IndentRule::catch_all()) {
            return Err(IndentError::MalformedRule {
                index: rules.len(),
                reason: "the table must end with the catch-all rule \
                         (any, any, any) → parent-bol + 1 unit"
                    .to_string(),
            });
        }

        let mut compiled = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            if rule.is_unconditional() && Some(index) != last {
                return Err(IndentError::MalformedRule {
                    index,
                    reason: "unconditional rule before the end of the table".to_string(),
                });
            }
            let matcher = |m: &NodeMatcher| compile_matcher(grammar, m, index);
            compiled.push(CompiledRule {
                node: matcher(&rule.node)?,
                parent: matcher(&rule.parent)?,
                grandparent: matcher(&rule.grandparent)?,
                anchor: rule.anchor,
                offset: rule.offset,
            });
        }

        debug!(grammar = grammar.name(), rules = compiled.len(), unit, "compiled indent rules");
        Ok(Self {
            rules: compiled,
            unit,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// Target column of `node`, which must belong to `tree`.
    pub fn compute_indent(&self, tree: &Tree, node: &Node<'_>) -> u32 {
        self.column_for(tree, Some(node), node.parent())
    }

    /// Index of the first rule matching the chain.
    fn select(&self, node: Option<&Node<'_>>, parent: &Node<'_>) -> Option<usize> {
        let grandparent = parent.parent();
        self.rules.iter().position(|rule| {
            rule.node.matches(node)
                && rule.parent.matches(Some(parent))
                && rule.grandparent.matches(grandparent.as_ref())
        })
    }

    fn column_for(&self, tree: &Tree, node: Option<&Node<'_>>, parent: Option<Node<'_>>) -> u32 {
        let Some(parent) = parent else {
            return 0;
        };
        let (anchor, offset) = match self.select(node, &parent) {
            Some(index) => (self.rules[index].anchor, self.rules[index].offset),
            None => (Anchor::ParentBol, Offset::Units(1)),
        };

        let lines = tree.line_index();
        let start = parent.start();
        let base = match anchor {
            Anchor::Parent => lines.column(tree.text(), start),
            Anchor::ParentBol => lines.indentation(tree.text(), lines.line_of(start)),
        };
        let column = base.saturating_add(offset.columns(self.unit));
        trace!(
            node = ?node,
            parent = ?parent,
            ?anchor,
            column,
            "computed indent"
        );
        column
    }

    /// Target column for `line`, or `None` when the line does not exist.
    ///
    /// The line's subject is the largest node starting at its first
    /// non-blank character. A blank line has no subject; its parent is the
    /// innermost node spanning the line start. A line that begins inside a
    /// multi-line token, blank or not, keeps its current indentation. A
    /// trailing `\r` does not make a line non-blank.
    pub fn indent_for_line(&self, tree: &Tree, line: u32) -> Option<u32> {
        let lines = tree.line_index();
        let range = lines.line_range(line)?;
        let indentation = lines.indentation(tree.text(), line);
        let first = range.start() + TextSize::from(indentation);

        let enclosing = tree.node_at(range.start());
        if enclosing.is_token() && enclosing.start() < range.start() {
            return Some(indentation);
        }

        let rest = &tree.text()[TextRange::new(first, range.end())];
        if rest.trim_end_matches('\r').is_empty() {
            let parent = innermost_spanning(tree, range.start());
            return Some(self.column_for(tree, None, Some(parent)));
        }

        let token = tree.node_at(first);
        if token.start() != first {
            return Some(indentation);
        }
        let subject = largest_starting_at(token, first);
        Some(self.compute_indent(tree, &subject))
    }
}

fn compile_matcher(
    grammar: &Grammar,
    matcher: &NodeMatcher,
    index: usize,
) -> Result<Matcher, IndentError> {
    let kinds = |names: &[SmolStr]| -> Result<FxHashSet<RawKind>, IndentError> {
        let mut kinds = FxHashSet::default();
        for name in names {
            let found: Vec<RawKind> = [grammar.named_kind(name), grammar.literal_kind(name)]
                .into_iter()
                .flatten()
                .collect();
            if found.is_empty() {
                return Err(IndentError::MalformedRule {
                    index,
                    reason: format!("unknown node kind `{name}`"),
                });
            }
            kinds.extend(found);
        }
        Ok(kinds)
    };

    Ok(match matcher {
        NodeMatcher::Any => Matcher::Any,
        NodeMatcher::Kind(name) => Matcher::Kinds(kinds(std::slice::from_ref(name))?),
        NodeMatcher::OneOf(names) => Matcher::Kinds(kinds(names)?),
        NodeMatcher::AfterSibling(name) => {
            Matcher::AfterSibling(kinds(std::slice::from_ref(name))?)
        }
        NodeMatcher::Field(field) => {
            if !grammar.has_field(field) {
                return Err(IndentError::MalformedRule {
                    index,
                    reason: format!("unknown field `{field}`"),
                });
            }
            Matcher::Field(field.clone())
        }
    })
}

/// Climb while the parent starts at the same offset, stopping below the root.
fn largest_starting_at(mut node: Node<'_>, offset: TextSize) -> Node<'_> {
    while let Some(parent) = node.parent() {
        if parent.start() != offset || parent.parent().is_none() {
            break;
        }
        node = parent;
    }
    node
}

/// The innermost interior node whose range strictly contains `offset`.
fn innermost_spanning(tree: &Tree, offset: TextSize) -> Node<'_> {
    let mut node = tree.root();
    'descend: loop {
        for child in node.children() {
            let range = child.range();
            if !child.is_token() && range.start() < offset && offset < range.end() {
                node = child;
                continue 'descend;
            }
        }
        return node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{self, MiniZinc};
    use crate::tree::GrammarProvider;

    fn rules(table: Vec<IndentRule>) -> Result<IndentRules, IndentError> {
        IndentRules::compile(&syntax::grammar(), &table, 2)
    }

    fn reason(result: Result<IndentRules, IndentError>) -> (usize, String) {
        match result {
            Err(IndentError::MalformedRule { index, reason }) => (index, reason),
            Ok(_) => panic!("rule table compiled"),
        }
    }

    #[test]
    fn test_missing_catch_all() {
        let (index, _) = reason(rules(vec![]));
        assert_eq!(index, 0);

        let table = vec![IndentRule::new(
            NodeMatcher::kind("]"),
            NodeMatcher::Any,
            Anchor::ParentBol,
            Offset::Columns(0),
        )];
        let (index, reason) = reason(rules(table));
        assert_eq!(index, 1);
        assert!(reason.contains("catch-all"));
    }

    #[test]
    fn test_catch_all_must_be_last() {
        let table = vec![
            IndentRule::catch_all(),
            IndentRule::new(
                NodeMatcher::kind("]"),
                NodeMatcher::Any,
                Anchor::ParentBol,
                Offset::Columns(0),
            ),
            IndentRule::catch_all(),
        ];
        assert_eq!(reason(rules(table)).0, 0);
    }

    #[test]
    fn test_unknown_kind_and_field() {
        let table = vec![
            IndentRule::new(
                NodeMatcher::kind("endwhile"),
                NodeMatcher::Any,
                Anchor::Parent,
                Offset::Columns(0),
            ),
            IndentRule::catch_all(),
        ];
        assert_eq!(reason(rules(table)), (0, "unknown node kind `endwhile`".to_string()));

        let table = vec![
            IndentRule::new(
                NodeMatcher::Any,
                NodeMatcher::Field("body2".into()),
                Anchor::Parent,
                Offset::Columns(0),
            ),
            IndentRule::catch_all(),
        ];
        assert_eq!(reason(rules(table)), (0, "unknown field `body2`".to_string()));
    }

    #[test]
    fn test_catch_all_only_table() {
        let rules = rules(vec![IndentRule::catch_all()]).unwrap();
        let tree = MiniZinc.parse("constraint\nx;");

        assert_eq!(rules.indent_for_line(&tree, 0), Some(2));
        assert_eq!(rules.indent_for_line(&tree, 1), Some(2));
        assert_eq!(rules.indent_for_line(&tree, 2), None);
        assert_eq!(rules.compute_indent(&tree, &tree.root()), 0);
    }

    #[test]
    fn test_field_and_sibling_matchers() {
        let rule = |node, anchor, columns| {
            IndentRule::new(node, NodeMatcher::Any, anchor, Offset::Columns(columns))
        };
        let table = vec![
            rule(NodeMatcher::Field("alternative".into()), Anchor::Parent, 7),
            rule(NodeMatcher::AfterSibling("then".into()), Anchor::Parent, 5),
            IndentRule::new(
                NodeMatcher::Any,
                NodeMatcher::kind("source_file"),
                Anchor::Parent,
                Offset::Columns(0),
            ),
            IndentRule::catch_all(),
        ];
        let rules = rules(table).unwrap();
        let tree = MiniZinc.parse("x = if a then\nb\nelse\nc endif;");

        assert_eq!(rules.indent_for_line(&tree, 0), Some(0));
        assert_eq!(rules.indent_for_line(&tree, 1), Some(9));
        assert_eq!(rules.indent_for_line(&tree, 2), Some(2));
        assert_eq!(rules.indent_for_line(&tree, 3), Some(11));
    }
}
