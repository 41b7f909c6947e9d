//! Editor-facing layer: buffers, cached results and session settings.
//!
//! This module is the interface between the engine and an editor adapter.
//! Each method of [`EngineHost`] corresponds to one editor request.
//!
//! ## Design Principles
//!
//! 1. **No editor types**: ranges and columns are our own, converted by the adapter
//! 2. **Snapshots**: every edit produces a new tree; results never outlive their snapshot
//! 3. **Degrade, don't fail**: a buffer whose grammar is missing stays open but disabled
//!
//! ## Usage
//!
//! ```ignore
//! use mzn::ide::EngineHost;
//!
//! let mut host = EngineHost::new()?;
//! let buffer = host.open("minizinc", "int: n = 3;");
//! let tokens = host.styled_tokens(buffer, None)?;
//! ```

mod host;
mod session;
mod styled_tokens;

pub use host::{CACHED_REGIONS, EngineHost};
pub use session::{SessionConfig, SolverCommand};
pub use styled_tokens::{StyledToken, styled_tokens};
