//! Immutable parse snapshots.

use std::sync::Arc;

use rowan::{GreenNode, NodeOrToken};

use super::grammar::Grammar;
use super::node::{Node, RawNode};
use crate::base::{LineIndex, TextRange, TextSize, floor_char_boundary};

/// A recoverable problem found while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub range: TextRange,
    pub message: Arc<str>,
}

impl SyntaxError {
    pub fn new(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

/// A text replacement: `range` of the old text becomes `insert`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub insert: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, insert: impl Into<String>) -> Self {
        Self {
            range,
            insert: insert.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, "")
    }

    /// Apply the edit to `text`, returning the new text.
    ///
    /// Ranges are clamped to the text, and offsets inside a multi-byte
    /// character move back to its start, so a stale edit cannot panic.
    pub fn apply(&self, text: &str) -> String {
        let start = floor_char_boundary(text, self.range.start());
        let end = floor_char_boundary(text, self.range.end()).max(start);
        let mut out = String::with_capacity(text.len() + self.insert.len());
        out.push_str(&text[..usize::from(start)]);
        out.push_str(&self.insert);
        out.push_str(&text[usize::from(end)..]);
        out
    }
}

/// One parse of one version of a buffer.
///
/// Snapshots are never mutated; an edit produces a new snapshot. The green
/// tree is shared and cheap to clone.
#[derive(Clone, Debug)]
pub struct Tree {
    grammar: Arc<Grammar>,
    green: GreenNode,
    text: Arc<str>,
    line_index: LineIndex,
    errors: Vec<SyntaxError>,
}

impl Tree {
    pub fn new(
        grammar: Arc<Grammar>,
        green: GreenNode,
        text: impl Into<Arc<str>>,
        errors: Vec<SyntaxError>,
    ) -> Self {
        let text = text.into();
        Self {
            line_index: LineIndex::new(&text),
            grammar,
            green,
            text,
            errors,
        }
    }

    /// A node view of the root.
    pub fn root(&self) -> Node<'_> {
        let root = RawNode::new_root(self.green.clone());
        Node::new(NodeOrToken::Node(root), &self.grammar)
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Range covering the whole text.
    pub fn full_range(&self) -> TextRange {
        TextRange::up_to(TextSize::of(&*self.text))
    }

    /// The innermost non-trivia node whose range contains `offset`.
    ///
    /// Tokens win over the nodes that contain them; at a boundary between two
    /// tokens the right one is preferred.
    pub fn node_at(&self, offset: TextSize) -> Node<'_> {
        let mut node = self.root();
        'descend: loop {
            for child in node.children() {
                let range = child.range();
                if range.start() <= offset && offset < range.end() {
                    node = child;
                    continue 'descend;
                }
            }
            return node;
        }
    }

    /// Render the tree as an indented outline, one element per line, followed
    /// by the parse errors with their 1-indexed positions.
    pub fn debug_dump(&self) -> String {
        fn walk(node: &Node<'_>, depth: usize, out: &mut String) {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{:?}", node));
            if node.is_token() {
                out.push_str(&format!(" {:?}", node.text()));
            }
            out.push('\n');
            for child in node.children() {
                walk(&child, depth + 1, out);
            }
        }
        let mut out = String::new();
        walk(&self.root(), 0, &mut out);
        for error in &self.errors {
            let at = self.line_index.line_col(error.range.start());
            out.push_str(&format!("error {at}: {}\n", error.message));
        }
        out
    }
}
