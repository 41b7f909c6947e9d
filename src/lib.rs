//! # mzn-syntax
//!
//! Query-driven syntax highlighting and indentation for MiniZinc source text.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → EngineHost: buffers, caching, session settings
//!   ↓
//! highlight → captures resolved to one style tag per byte
//! indent    → decision-list indentation over (node, parent, grandparent)
//!   ↓
//! query     → pattern DSL compiler + capture execution
//!   ↓
//! syntax    → MiniZinc lexer + parser + schema (logos, rowan)
//!   ↓
//! tree      → grammar schema, snapshots, node views, provider registry
//!   ↓
//! base      → Primitives (BufferId, TextRange, LineIndex)
//! ```
//!
//! `config` loads everything the host is built from, in YAML or JSON.

/// Foundation types: BufferId, text ranges, line index
pub mod base;

/// Grammar schema, tree snapshots and node views
pub mod tree;

/// The MiniZinc reference grammar
pub mod syntax;

/// Pattern queries over trees
pub mod query;

/// Highlight resolution
pub mod highlight;

/// Indentation rules
pub mod indent;

pub mod config;
mod error;

/// Editor-facing host
pub mod ide;

pub use base::{BufferId, LineCol, LineIndex, TextRange, TextSize};
pub use config::{ConfigError, EngineConfig};
pub use error::EngineError;
pub use highlight::{FeatureSet, Highlighter, StyleRange};
pub use ide::EngineHost;
pub use indent::{IndentError, IndentRule, IndentRules};
pub use query::{CompiledQuerySet, QueryError, QueryRule};
pub use tree::{GrammarError, GrammarProvider, GrammarRegistry, TextEdit, Tree};
