//! Query engine: S-expression patterns compiled against a grammar schema.
//!
//! ```text
//! (call function: (identifier) @function)       ; node with a field
//! ["constraint" "solve"] @keyword               ; alternation of tokens
//! ((identifier) @b (#match? @b "^int_"))        ; predicate group
//! (array_literal "[" . (_) @first)              ; anchor
//! ```
//!
//! A rule table is an ordered list of [`QueryRule`] groups, one feature
//! each. [`compile`] validates every kind, field, token and predicate and
//! fails with [`QueryError::MalformedPattern`] on the first problem.
//! [`execute`] reports every capture of every matching pattern, in tree
//! order and then table order.

mod compile;
mod exec;
mod lexer;
mod pattern;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

pub use exec::{Capture, CompiledQuerySet, compile, execute};
pub use pattern::{CaptureId, ChildStep, NodeTest, Pattern, PatternNode, Predicate};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed pattern in rule {rule} at offset {offset}: {reason}")]
    MalformedPattern {
        /// Index of the offending rule group.
        rule: usize,
        /// Byte offset into that rule's query source.
        offset: usize,
        reason: String,
    },
}

/// A group of patterns that share one feature and override flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRule {
    pub feature: SmolStr,
    /// Captures of an override group win over plain captures of the same level.
    #[serde(default, rename = "override")]
    pub overrides: bool,
    pub query: String,
}

impl QueryRule {
    pub fn new(feature: impl Into<SmolStr>, query: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            overrides: false,
            query: query.into(),
        }
    }

    /// Mark the group as overriding.
    pub fn overriding(mut self) -> Self {
        self.overrides = true;
        self
    }
}
