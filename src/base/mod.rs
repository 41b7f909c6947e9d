//! Foundation types for the engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`BufferId`] - Identifiers for buffers tracked by a host
//! - [`TextRange`], [`TextSize`] - Source positions
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//!
//! This module has NO dependencies on other crate modules.

mod buffer_id;
mod span;

pub use buffer_id::BufferId;
pub use span::{
    LineCol, LineIndex, TextRange, TextSize, ceil_char_boundary, floor_char_boundary, snap_to_chars,
};

// Re-export text-size types for convenience
pub use text_size;
