//! The crate-level error returned by [`EngineHost`](crate::ide::EngineHost).

use thiserror::Error;

use crate::base::BufferId;
use crate::config::ConfigError;
use crate::indent::IndentError;
use crate::query::QueryError;
use crate::tree::GrammarError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Indent(#[from] IndentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown buffer: {0}")]
    UnknownBuffer(BufferId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    #[test]
    fn test_wrapped_errors_display_transparently() {
        let err = EngineError::from(GrammarError::Unavailable(SmolStr::new("python")));
        assert_eq!(err.to_string(), "grammar unavailable: python");

        let err = EngineError::UnknownBuffer(BufferId::new(4));
        assert_eq!(err.to_string(), "unknown buffer: buffer#4");
    }
}
