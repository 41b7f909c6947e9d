//! Styled tokens: resolved style ranges as line/column runs for renderers.

use smol_str::SmolStr;

use crate::base::{TextSize, snap_to_chars};
use crate::highlight::StyleRange;
use crate::tree::Tree;

/// One styled run on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledToken {
    /// Line number (0-indexed)
    pub line: u32,
    /// Column number (0-indexed, in characters)
    pub col: u32,
    /// Length of the run in characters
    pub length: u32,
    pub tag: SmolStr,
}

/// Split the styled ranges of `ranges` into per-line runs.
///
/// Unstyled ranges produce nothing; a range spanning several lines yields
/// one run per line, newlines excluded. A range edge inside a multi-byte
/// character widens to cover the whole character.
pub fn styled_tokens(tree: &Tree, ranges: &[StyleRange]) -> Vec<StyledToken> {
    let lines = tree.line_index();
    let text = tree.text();
    let mut tokens = Vec::new();

    for range in ranges {
        let Some(tag) = &range.tag else {
            continue;
        };
        if range.range.is_empty() {
            continue;
        }
        let first = lines.line_of(range.range.start());
        let last = lines.line_of(range.range.end() - TextSize::from(1));
        for line in first..=last {
            let Some(segment) = lines
                .line_range(line)
                .and_then(|line_range| line_range.intersect(range.range))
                .map(|segment| snap_to_chars(text, segment))
                .filter(|segment| !segment.is_empty())
            else {
                continue;
            };
            tokens.push(StyledToken {
                line,
                col: lines.column(text, segment.start()),
                length: text[segment].chars().count() as u32,
                tag: tag.clone(),
            });
        }
    }

    tokens.sort_by_key(|t| (t.line, t.col));
    tokens
}
