//! Source text positions and ranges.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

/// A 0-indexed line and byte column. Displayed 1-indexed, as editors do.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    /// Byte offset from the line start (see [`LineIndex::column`] for characters)
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// The closest char boundary at or before `offset`, clamped to the text.
pub fn floor_char_boundary(text: &str, offset: TextSize) -> TextSize {
    let mut index = usize::from(offset).min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    TextSize::from(index as u32)
}

/// The closest char boundary at or after `offset`, clamped to the text.
pub fn ceil_char_boundary(text: &str, offset: TextSize) -> TextSize {
    let mut index = usize::from(offset).min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    TextSize::from(index as u32)
}

/// Widen `range` to char boundaries, clamped to the text.
pub fn snap_to_chars(text: &str, range: TextRange) -> TextRange {
    let start = floor_char_boundary(text, range.start());
    let end = ceil_char_boundary(text, range.end()).max(start);
    TextRange::new(start, end)
}

/// Index for converting between byte offsets and line/column positions.
///
/// Also answers the two questions indentation needs: the display column of an
/// offset, and the indentation column of a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
    /// Total length of the indexed text
    len: TextSize,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Convert a byte offset to a line/column position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self.line_of(offset);
        let col = offset - self.line_starts[line as usize];

        LineCol {
            line,
            col: col.into(),
        }
    }

    /// The 0-indexed line containing `offset`.
    pub fn line_of(&self, offset: TextSize) -> u32 {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1) as u32
    }

    /// Convert a line/column position to a byte offset.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line_start = self.line_starts.get(line_col.line as usize)?;
        Some(*line_start + TextSize::from(line_col.col))
    }

    /// Byte offset of the start of `line`.
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    /// Byte range of `line`, excluding its terminating newline.
    pub fn line_range(&self, line: u32) -> Option<TextRange> {
        let start = self.line_start(line)?;
        let end = match self.line_starts.get(line as usize + 1) {
            Some(next) => *next - TextSize::from(1),
            None => self.len,
        };
        Some(TextRange::new(start, end))
    }

    /// Display column of `offset`: the number of characters between the start
    /// of its line and the offset.
    ///
    /// An offset inside a multi-byte character counts as that character's
    /// start.
    pub fn column(&self, text: &str, offset: TextSize) -> u32 {
        let offset = floor_char_boundary(text, offset);
        let line = self.line_of(offset);
        let start = self.line_starts[line as usize];
        text[TextRange::new(start, offset)].chars().count() as u32
    }

    /// Indentation column of `line`: the number of leading blanks.
    pub fn indentation(&self, text: &str, line: u32) -> u32 {
        let Some(range) = self.line_range(line) else {
            return 0;
        };
        text[range]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .count() as u32
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    /// Check if there are no lines (never true: empty text has one line).
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}
