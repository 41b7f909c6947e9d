//! Borrowed node views over rowan trees.

use std::fmt;
use std::hash::{Hash, Hasher};

use rowan::NodeOrToken;

use super::grammar::Grammar;
use crate::base::{TextRange, TextSize};

/// Raw node-type tag as stored in the green tree.
pub type RawKind = rowan::SyntaxKind;

/// Language marker that keeps kinds raw, so one tree type serves every grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnyLang {}

impl rowan::Language for AnyLang {
    type Kind = RawKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind
    }
}

/// An interior node of the raw tree.
pub type RawNode = rowan::SyntaxNode<AnyLang>;
/// A leaf token of the raw tree.
pub type RawToken = rowan::SyntaxToken<AnyLang>;
/// Either a node or a token.
pub type RawElement = rowan::SyntaxElement<AnyLang>;

/// A syntax node as seen by queries and indentation rules.
///
/// Both interior nodes and leaf tokens are nodes here; trivia is hidden.
/// The view borrows the grammar so that field lookups need no extra argument.
#[derive(Clone)]
pub struct Node<'g> {
    elem: RawElement,
    grammar: &'g Grammar,
}

impl<'g> Node<'g> {
    pub fn new(elem: RawElement, grammar: &'g Grammar) -> Self {
        Self { elem, grammar }
    }

    pub fn raw(&self) -> &RawElement {
        &self.elem
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn kind(&self) -> RawKind {
        self.elem.kind()
    }

    pub fn kind_name(&self) -> &'g str {
        self.grammar.kind_name(self.kind())
    }

    pub fn is_named(&self) -> bool {
        self.grammar.is_named(self.kind())
    }

    pub fn is_token(&self) -> bool {
        self.elem.as_token().is_some()
    }

    pub fn range(&self) -> TextRange {
        self.elem.text_range()
    }

    pub fn start(&self) -> TextSize {
        self.range().start()
    }

    /// Source text covered by the node.
    pub fn text(&self) -> String {
        match &self.elem {
            NodeOrToken::Node(node) => node.text().to_string(),
            NodeOrToken::Token(token) => token.text().to_string(),
        }
    }

    pub fn parent(&self) -> Option<Node<'g>> {
        let parent = match &self.elem {
            NodeOrToken::Node(node) => node.parent()?,
            NodeOrToken::Token(token) => token.parent()?,
        };
        Some(Node::new(NodeOrToken::Node(parent), self.grammar))
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'g>> + use<'g> {
        std::iter::successors(self.parent(), Node::parent)
    }

    /// Non-trivia children in source order.
    pub fn children(&self) -> Vec<Node<'g>> {
        let Some(node) = self.elem.as_node() else {
            return Vec::new();
        };
        node.children_with_tokens()
            .filter(|child| !self.grammar.is_trivia(child.kind()))
            .map(|child| Node::new(child, self.grammar))
            .collect()
    }

    pub fn named_children(&self) -> Vec<Node<'g>> {
        self.children().into_iter().filter(Node::is_named).collect()
    }

    /// The closest preceding non-trivia sibling.
    pub fn prev_sibling(&self) -> Option<Node<'g>> {
        let mut current = self.elem.prev_sibling_or_token();
        while let Some(elem) = current {
            if !self.grammar.is_trivia(elem.kind()) {
                return Some(Node::new(elem, self.grammar));
            }
            current = elem.prev_sibling_or_token();
        }
        None
    }

    /// Children stored under `field`.
    pub fn field(&self, field: &str) -> Vec<Node<'g>> {
        self.grammar.field_children(self, field)
    }

    /// The field of the parent this node occupies.
    pub fn field_name(&self) -> Option<&'g str> {
        self.grammar.field_of(self)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elem.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind_name(), self.range())
    }
}
