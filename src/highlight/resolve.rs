//! Overlap resolution: captures in, a partition of the region out.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use smol_str::SmolStr;
use tracing::trace;

use super::features::FeatureSet;
use crate::base::{TextRange, TextSize};
use crate::query::Capture;

/// A styled (or unstyled) slice of the queried region.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StyleRange {
    pub range: TextRange,
    pub tag: Option<SmolStr>,
}

impl StyleRange {
    pub fn new(range: TextRange, tag: Option<SmolStr>) -> Self {
        Self { range, tag }
    }
}

/// Ordering key of a capture; the smallest key wins a byte.
///
/// Fields compare in declaration order: level, then override, then
/// specificity, then pattern index, then width, then emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Priority {
    level: usize,
    plain: bool,
    specificity: Reverse<u32>,
    pattern: usize,
    width: TextSize,
    sequence: usize,
}

#[derive(Debug)]
struct Interval {
    range: TextRange,
    priority: Priority,
    tag: SmolStr,
}

/// Resolve `captures` into a non-overlapping partition of `region`.
///
/// Captures of disabled features are dropped and the rest are clipped to
/// the region. Every byte of the region lands in exactly one output range;
/// bytes no capture covers get `tag: None`. Adjacent ranges never share a
/// tag.
pub fn resolve(
    captures: &[Capture<'_>],
    features: &FeatureSet,
    region: TextRange,
) -> Vec<StyleRange> {
    let mut intervals: Vec<Interval> = captures
        .iter()
        .enumerate()
        .filter_map(|(sequence, capture)| {
            let level = features.priority(&capture.feature)?;
            let full = capture.range();
            let range = full.intersect(region).filter(|r| !r.is_empty())?;
            Some(Interval {
                range,
                priority: Priority {
                    level,
                    plain: !capture.overrides,
                    specificity: Reverse(capture.specificity),
                    pattern: capture.pattern,
                    width: full.len(),
                    sequence,
                },
                tag: capture.tag.clone(),
            })
        })
        .collect();
    intervals.sort_by_key(|i| (i.range.start(), i.priority));

    let mut bounds: Vec<TextSize> = intervals
        .iter()
        .flat_map(|i| [i.range.start(), i.range.end()])
        .chain([region.start(), region.end()])
        .collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut out: Vec<StyleRange> = Vec::new();
    let mut active: BinaryHeap<Reverse<(Priority, TextSize, usize)>> = BinaryHeap::new();
    let mut next = 0;

    for window in bounds.windows(2) {
        let (start, end) = (window[0], window[1]);
        while let Some(interval) = intervals.get(next) {
            if interval.range.start() > start {
                break;
            }
            active.push(Reverse((interval.priority, interval.range.end(), next)));
            next += 1;
        }
        while active
            .peek()
            .is_some_and(|Reverse((_, until, _))| *until <= start)
        {
            active.pop();
        }

        let tag = active
            .peek()
            .map(|Reverse((_, _, index))| intervals[*index].tag.clone());
        match out.last_mut() {
            Some(last) if last.tag == tag && last.range.end() == start => {
                last.range = TextRange::new(last.range.start(), end);
            }
            _ => out.push(StyleRange::new(TextRange::new(start, end), tag)),
        }
    }

    trace!(
        captures = captures.len(),
        kept = intervals.len(),
        ranges = out.len(),
        "resolved highlight ranges"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryRule, compile};
    use crate::syntax::{self, MiniZinc};
    use crate::tree::GrammarProvider;

    fn features() -> FeatureSet {
        FeatureSet::new(
            vec![
                vec!["comment".into()],
                vec!["keyword".into()],
                vec!["variable".into(), "function".into()],
            ],
            3,
        )
    }

    fn styled(
        source: &str,
        rules: &[QueryRule],
        features: &FeatureSet,
    ) -> Vec<(String, Option<String>)> {
        let tree = MiniZinc.parse(source);
        let set = compile(&syntax::grammar(), rules).unwrap();
        let captures = set.execute(&tree.root(), tree.full_range());
        resolve(&captures, features, tree.full_range())
            .into_iter()
            .map(|r| {
                (
                    source[std::ops::Range::<usize>::from(r.range)].to_string(),
                    r.tag.map(|t| t.to_string()),
                )
            })
            .collect()
    }

    #[test]
    fn test_partition_with_gaps() {
        let out = styled(
            "int: x;",
            &[QueryRule::new("keyword", r#""int" @keyword"#)],
            &features(),
        );
        assert_eq!(
            out,
            vec![
                ("int".to_string(), Some("keyword".to_string())),
                (": x;".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_more_specific_pattern_wins_within_level() {
        let out = styled(
            "constraint f(x);",
            &[
                QueryRule::new("variable", "(identifier) @variable"),
                QueryRule::new("function", "(call function: (identifier) @function)"),
            ],
            &features(),
        );
        assert!(out.contains(&("f".to_string(), Some("function".to_string()))));
        assert!(out.contains(&("x".to_string(), Some("variable".to_string()))));
    }

    #[test]
    fn test_override_wins_within_level() {
        let rules = [
            QueryRule::new("variable", "(call) @call"),
            QueryRule::new("function", "(identifier) @name").overriding(),
        ];
        let out = styled("x = f(y);", &rules, &features());
        assert_eq!(
            out,
            vec![
                ("x".to_string(), Some("name".to_string())),
                (" = ".to_string(), None),
                ("f".to_string(), Some("name".to_string())),
                ("(".to_string(), Some("call".to_string())),
                ("y".to_string(), Some("name".to_string())),
                (")".to_string(), Some("call".to_string())),
                (";".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_earlier_level_wins_over_override() {
        let rules = [
            QueryRule::new("comment", "(call) @outer"),
            QueryRule::new("variable", "(identifier) @inner").overriding(),
        ];
        let out = styled("x = f(y);", &rules, &features());
        assert!(out.contains(&("f(y)".to_string(), Some("outer".to_string()))));
    }

    #[test]
    fn test_disabled_features_are_dropped() {
        let rules = [QueryRule::new("variable", "(identifier) @variable")];
        let out = styled("x = y;", &rules, &features().with_level(2));
        assert_eq!(out, vec![("x = y;".to_string(), None)]);
    }

    #[test]
    fn test_region_clips_captures() {
        let tree = MiniZinc.parse("% a long comment\nx = 1;");
        let set = compile(
            &syntax::grammar(),
            &[QueryRule::new("comment", "(line_comment) @comment")],
        )
        .unwrap();
        let region = TextRange::new(2.into(), 8.into());
        let captures = set.execute(&tree.root(), region);

        assert_eq!(
            resolve(&captures, &features(), region),
            vec![StyleRange::new(region, Some("comment".into()))]
        );
    }

    #[test]
    fn test_empty_region() {
        assert!(resolve(&[], &features(), TextRange::empty(3.into())).is_empty());
    }
}
