//! Compiled query sets and their execution over a tree.

use smol_str::SmolStr;
use tracing::{debug, trace};

use super::compile::{RuleMeta, compile_source};
use super::pattern::Pattern;
use super::{QueryError, QueryRule};
use crate::base::TextRange;
use crate::tree::{Grammar, Node};

/// One match result: a node captured under a tag by some pattern.
#[derive(Clone, Debug)]
pub struct Capture<'t> {
    /// Index of the pattern in its compiled set.
    pub pattern: usize,
    /// Index of the rule group that declared the pattern.
    pub rule: usize,
    pub node: Node<'t>,
    pub tag: SmolStr,
    pub feature: SmolStr,
    pub overrides: bool,
    pub specificity: u32,
}

impl Capture<'_> {
    pub fn range(&self) -> TextRange {
        self.node.range()
    }
}

/// Every pattern of a rule table, compiled against one grammar.
#[derive(Clone, Debug)]
pub struct CompiledQuerySet {
    grammar: SmolStr,
    patterns: Vec<Pattern>,
    features: Vec<SmolStr>,
}

impl CompiledQuerySet {
    /// Compile a rule table. Patterns are numbered in table order.
    pub fn compile(grammar: &Grammar, rules: &[QueryRule]) -> Result<Self, QueryError> {
        let mut patterns = Vec::new();
        let mut features: Vec<SmolStr> = Vec::new();

        for (rule, entry) in rules.iter().enumerate() {
            let meta = RuleMeta {
                rule,
                feature: &entry.feature,
                overrides: entry.overrides,
            };
            let compiled = compile_source(grammar, &entry.query, meta, patterns.len())?;
            patterns.extend(compiled);
            if !features.contains(&entry.feature) {
                features.push(entry.feature.clone());
            }
        }

        debug!(
            grammar = grammar.name(),
            rules = rules.len(),
            patterns = patterns.len(),
            features = ?features,
            "compiled query set"
        );
        Ok(Self {
            grammar: SmolStr::new(grammar.name()),
            patterns,
            features,
        })
    }

    /// Name of the grammar the set was validated against.
    pub fn grammar(&self) -> &str {
        &self.grammar
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Feature names in order of first appearance in the rule table.
    pub fn features(&self) -> &[SmolStr] {
        &self.features
    }

    /// Run every pattern against every node overlapping `region`.
    ///
    /// Nodes are visited in preorder; at each node patterns are tried in
    /// table order and every match is reported. Captures whose name starts
    /// with `_` only feed predicates and are not reported.
    pub fn execute<'t>(&self, root: &Node<'t>, region: TextRange) -> Vec<Capture<'t>> {
        let mut captures = Vec::new();
        let mut stack = vec![root.clone()];
        let mut visited = 0usize;

        while let Some(node) = stack.pop() {
            let range = node.range();
            if !(range.start() < region.end() && region.start() < range.end()) {
                continue;
            }
            visited += 1;

            for pattern in &self.patterns {
                let Some(bindings) = pattern.matches(&node) else {
                    continue;
                };
                for (id, captured) in bindings {
                    let tag = &pattern.capture_names[id];
                    if tag.starts_with('_') {
                        continue;
                    }
                    captures.push(Capture {
                        pattern: pattern.index,
                        rule: pattern.rule,
                        node: captured,
                        tag: tag.clone(),
                        feature: pattern.feature.clone(),
                        overrides: pattern.overrides,
                        specificity: pattern.specificity,
                    });
                }
            }

            stack.extend(node.children().into_iter().rev());
        }

        trace!(
            ?region,
            nodes = visited,
            captures = captures.len(),
            "executed query set"
        );
        captures
    }
}

/// Compile a rule table against `grammar`.
pub fn compile(grammar: &Grammar, rules: &[QueryRule]) -> Result<CompiledQuerySet, QueryError> {
    CompiledQuerySet::compile(grammar, rules)
}

/// Execute `set` over the part of the tree under `root` that overlaps `region`.
pub fn execute<'t>(
    set: &CompiledQuerySet,
    root: &Node<'t>,
    region: TextRange,
) -> Vec<Capture<'t>> {
    set.execute(root, region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{self, MiniZinc};
    use crate::tree::GrammarProvider;

    fn rule(feature: &str, query: &str) -> QueryRule {
        QueryRule::new(feature, query)
    }

    fn tags(set: &CompiledQuerySet, source: &str) -> Vec<(String, String)> {
        let tree = MiniZinc.parse(source);
        set.execute(&tree.root(), tree.full_range())
            .into_iter()
            .map(|c| (c.tag.to_string(), c.node.text()))
            .collect()
    }

    #[test]
    fn test_captures_in_tree_order_then_table_order() {
        let set = compile(
            &syntax::grammar(),
            &[
                rule("variable", "(identifier) @variable"),
                rule("function", "(call function: (identifier) @function)"),
            ],
        )
        .unwrap();

        assert_eq!(
            tags(&set, "constraint f(x);"),
            vec![
                ("function".into(), "f".into()),
                ("variable".into(), "f".into()),
                ("variable".into(), "x".into()),
            ]
        );
    }

    #[test]
    fn test_region_limits_visited_nodes() {
        let rules = [rule("variable", "(identifier) @variable")];
        let set = compile(&syntax::grammar(), &rules).unwrap();
        let tree = MiniZinc.parse("int: a;\nint: b;\n");
        let region = TextRange::new(8.into(), 15.into());

        let names: Vec<_> = set
            .execute(&tree.root(), region)
            .into_iter()
            .map(|c| c.node.text())
            .collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_predicates_filter_matches() {
        let set = compile(
            &syntax::grammar(),
            &[rule(
                "builtin",
                r#"((call function: (identifier) @builtin) (#any-of? @builtin "forall" "exists"))"#,
            )],
        )
        .unwrap();

        assert_eq!(
            tags(&set, "constraint forall(x) /\\ g(y);"),
            vec![("builtin".into(), "forall".into())]
        );
    }

    #[test]
    fn test_underscore_captures_are_hidden() {
        let set = compile(
            &syntax::grammar(),
            &[rule(
                "function",
                r#"((call function: (identifier) @_name) @call (#eq? @_name "f"))"#,
            )],
        )
        .unwrap();

        assert_eq!(
            tags(&set, "x = f(1) + g(2);"),
            vec![("call".into(), "f(1)".into())]
        );
    }

    #[test]
    fn test_anchored_first_member() {
        let set = compile(
            &syntax::grammar(),
            &[rule("first", r#"(array_literal "[" . (_) @first)"#)],
        )
        .unwrap();

        assert_eq!(
            tags(&set, "x = [1, 2, 3];"),
            vec![("first".into(), "1".into())]
        );
    }

    #[test]
    fn test_execution_is_deterministic() {
        let set = compile(
            &syntax::grammar(),
            &[
                rule("keyword", r#"["constraint" "in"] @keyword"#),
                rule("variable", "(identifier) @variable"),
                rule("number", "(integer_literal) @number"),
            ],
        )
        .unwrap();
        let source = "constraint forall(i in 1..3)(x[i] > 0);";

        assert_eq!(tags(&set, source), tags(&set, source));
    }
}
