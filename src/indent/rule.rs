//! Indentation rule data, as written in rule tables and config files.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Test applied to one position of the (node, parent, grandparent) chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeMatcher {
    /// Matches anything, including an absent node.
    #[default]
    Any,
    /// A named kind or an anonymous token's text.
    Kind(SmolStr),
    OneOf(Vec<SmolStr>),
    /// The node occupies this field of its parent.
    Field(SmolStr),
    /// The closest preceding non-trivia sibling has this kind.
    AfterSibling(SmolStr),
}

impl NodeMatcher {
    pub fn kind(name: impl Into<SmolStr>) -> Self {
        NodeMatcher::Kind(name.into())
    }

    pub fn one_of<S: Into<SmolStr>>(names: impl IntoIterator<Item = S>) -> Self {
        NodeMatcher::OneOf(names.into_iter().map(Into::into).collect())
    }
}

/// Where the column of a matching rule is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Column at which the parent starts.
    Parent,
    /// Indentation of the line on which the parent starts.
    ParentBol,
}

/// Amount added to the anchor column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Offset {
    Columns(u32),
    /// Multiples of the configured indent unit.
    Units(u32),
}

impl Offset {
    pub fn columns(self, unit: u32) -> u32 {
        match self {
            Offset::Columns(n) => n,
            Offset::Units(n) => n.saturating_mul(unit),
        }
    }
}

/// `(node, parent, grandparent) → (anchor, offset)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentRule {
    #[serde(default)]
    pub node: NodeMatcher,
    #[serde(default)]
    pub parent: NodeMatcher,
    #[serde(default)]
    pub grandparent: NodeMatcher,
    pub anchor: Anchor,
    pub offset: Offset,
}

impl IndentRule {
    pub fn new(node: NodeMatcher, parent: NodeMatcher, anchor: Anchor, offset: Offset) -> Self {
        Self {
            node,
            parent,
            grandparent: NodeMatcher::Any,
            anchor,
            offset,
        }
    }

    pub fn with_grandparent(mut self, grandparent: NodeMatcher) -> Self {
        self.grandparent = grandparent;
        self
    }

    /// The mandatory last rule: one unit past the parent's line indentation.
    pub fn catch_all() -> Self {
        Self::new(NodeMatcher::Any, NodeMatcher::Any, Anchor::ParentBol, Offset::Units(1))
    }

    /// Whether every matcher is `Any`.
    pub fn is_unconditional(&self) -> bool {
        [&self.node, &self.parent, &self.grandparent]
            .iter()
            .all(|m| **m == NodeMatcher::Any)
    }
}
