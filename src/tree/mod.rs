//! Syntax trees as the engine consumes them.
//!
//! Grammar providers produce [`Tree`] snapshots conforming to a [`Grammar`]
//! schema; the query engine and the indentation resolver only ever see
//! borrowed [`Node`] views of them.
//!
//! ```text
//! GrammarProvider ──parse──▶ Tree (green tree + text + line index)
//!                                │
//!                                └─root()─▶ Node<'_> ─▶ children / fields / parent
//! ```

mod grammar;
mod node;
mod provider;
mod snapshot;

pub use grammar::{FieldSelector, Grammar, GrammarBuilder, KindInfo};
pub use node::{AnyLang, Node, RawElement, RawKind, RawNode, RawToken};
pub use provider::{GrammarError, GrammarProvider, GrammarRegistry};
pub use snapshot::{SyntaxError, TextEdit, Tree};
