//! Property-based tests over arbitrary (mostly malformed) MiniZinc text.
//!
//! Whatever the parser makes of the input, highlighting must partition the
//! requested region, every styled byte must trace back to an enabled capture,
//! and every line must receive an indentation column.

use mzn::highlight::{self, FeatureSet, Highlighter, StyleRange};
use mzn::ide::styled_tokens;
use mzn::indent;
use mzn::query::{self, Capture};
use mzn::syntax::MiniZinc;
use mzn::tree::Node;
use mzn::{GrammarProvider, TextRange, TextSize};
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

const FRAGMENTS: &[&str] = &[
    "int", "var", ":", "x", "n", "=", "1", "2.5", ";", "\n", " ", "  ", "\t", "[|", "|]", "|",
    ",", "(", ")", "[", "]", "{", "}", "if", "then", "else", "endif", "let", "in", "% c\n",
    "/* b */", "\"s\"", "constraint", "forall", "true", "..", "+", "-", "$", "::", "solve",
    "satisfy", "predicate", "array", "of", "\"é\"", "é", "% ü\n",
];

/// Source text assembled from MiniZinc-ish fragments.
fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40).prop_map(|parts| parts.concat())
}

/// Source text together with a region inside it.
fn arb_source_and_region() -> impl Strategy<Value = (String, TextRange)> {
    arb_source().prop_flat_map(|source| {
        let len = source.len() as u32;
        (Just(source), 0..=len, 0..=len).prop_map(|(source, a, b)| {
            let range = TextRange::new(a.min(b).into(), a.max(b).into());
            (source, range)
        })
    })
}

fn highlighter() -> Highlighter {
    let mut highlighter = Highlighter::minizinc().unwrap();
    highlighter.set_features(FeatureSet::minizinc().with_level(4));
    highlighter
}

/// The parts of a capture that identify it across runs.
fn projection(captures: &[Capture<'_>]) -> Vec<(usize, usize, TextRange, String)> {
    captures
        .iter()
        .map(|c| (c.pattern, c.rule, c.range(), c.tag.to_string()))
        .collect()
}

fn all_nodes<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    for child in node.children() {
        all_nodes(child, out);
    }
    out.push(node);
}

fn assert_partition(ranges: &[StyleRange], region: TextRange) {
    if region.is_empty() {
        assert!(ranges.is_empty());
        return;
    }
    assert_eq!(ranges.first().unwrap().range.start(), region.start());
    assert_eq!(ranges.last().unwrap().range.end(), region.end());
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].range.end(), pair[1].range.start());
        assert_ne!(pair[0].tag, pair[1].tag, "adjacent ranges share a tag");
    }
    assert!(ranges.iter().all(|r| !r.range.is_empty()));
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_parse_is_lossless(source in arb_source()) {
        let tree = MiniZinc.parse(&source);
        prop_assert_eq!(tree.root().text(), source.as_str());
    }

    #[test]
    fn prop_highlight_partitions_full_buffer(source in arb_source()) {
        let tree = MiniZinc.parse(&source);
        let region = TextRange::up_to(TextSize::of(source.as_str()));
        assert_partition(&highlighter().highlight(&tree, region), region);
    }

    #[test]
    fn prop_highlight_partitions_any_region((source, region) in arb_source_and_region()) {
        let highlighter = highlighter();
        let tree = MiniZinc.parse(&source);
        let partial = highlighter.highlight(&tree, region);
        assert_partition(&partial, region);
        // region edges may fall inside a multi-byte character
        let tokens = styled_tokens(&tree, &partial);
        prop_assert!(tokens.iter().all(|t| t.length > 0));

        let full = highlighter.highlight(&tree, tree.full_range());
        for range in &partial {
            for offset in u32::from(range.range.start())..u32::from(range.range.end()) {
                let outer = full
                    .iter()
                    .find(|r| r.range.contains(offset.into()))
                    .map(|r| &r.tag);
                prop_assert_eq!(outer, Some(&range.tag));
            }
        }
    }

    #[test]
    fn prop_tags_come_from_enabled_captures((source, region) in arb_source_and_region()) {
        let highlighter = highlighter();
        let features = highlighter.features();
        let tree = MiniZinc.parse(&source);
        let captures = query::execute(highlighter.queries(), &tree.root(), region);
        let ranges = highlight::resolve(&captures, features, region);

        for range in &ranges {
            for offset in u32::from(range.range.start())..u32::from(range.range.end()) {
                let offset = TextSize::from(offset);
                let mut covering = captures
                    .iter()
                    .filter(|c| features.is_enabled(&c.feature) && c.range().contains(offset));
                match &range.tag {
                    Some(tag) => prop_assert!(
                        covering.any(|c| &c.tag == tag),
                        "{:?} at {:?} has no capture",
                        tag,
                        offset
                    ),
                    None => prop_assert!(covering.next().is_none(), "unstyled {:?}", offset),
                }
            }
        }
    }

    #[test]
    fn prop_execution_is_deterministic((source, region) in arb_source_and_region()) {
        let highlighter = highlighter();
        let tree = MiniZinc.parse(&source);
        let first = query::execute(highlighter.queries(), &tree.root(), region);
        let again = MiniZinc.parse(&source);
        let second = query::execute(highlighter.queries(), &again.root(), region);
        prop_assert_eq!(projection(&first), projection(&second));
    }

    #[test]
    fn prop_indentation_is_stable(source in arb_source()) {
        let rules = indent::minizinc().unwrap();
        let tree = MiniZinc.parse(&source);
        for line in 0..tree.line_index().len() as u32 {
            prop_assert_eq!(rules.indent_for_line(&tree, line), rules.indent_for_line(&tree, line));
        }
        let mut nodes = Vec::new();
        all_nodes(tree.root(), &mut nodes);
        for node in &nodes {
            prop_assert_eq!(rules.compute_indent(&tree, node), rules.compute_indent(&tree, node));
        }
    }

    #[test]
    fn prop_every_line_gets_a_column(source in arb_source()) {
        let rules = indent::minizinc().unwrap();
        let tree = MiniZinc.parse(&source);
        let lines = tree.line_index().len() as u32;
        for line in 0..lines {
            prop_assert!(rules.indent_for_line(&tree, line).is_some());
        }
        prop_assert_eq!(rules.indent_for_line(&tree, lines), None);
    }
}
