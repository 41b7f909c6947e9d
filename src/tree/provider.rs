//! The grammar provider boundary and the registry of available providers.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;

use super::grammar::Grammar;
use super::snapshot::{TextEdit, Tree};

/// Errors raised when resolving a grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar unavailable: {0}")]
    Unavailable(SmolStr),
}

/// Something that turns text into trees for one language.
pub trait GrammarProvider: Send + Sync {
    /// The schema every tree produced by this provider conforms to.
    fn grammar(&self) -> Arc<Grammar>;

    /// Parse a complete text.
    fn parse(&self, text: &str) -> Tree;

    /// Produce the snapshot following `edit`.
    ///
    /// The default re-parses the edited text from scratch.
    fn reparse(&self, old: &Tree, edit: &TextEdit) -> Tree {
        self.parse(&edit.apply(old.text()))
    }
}

/// Grammar providers by language name.
#[derive(Clone, Default)]
pub struct GrammarRegistry {
    providers: IndexMap<SmolStr, Arc<dyn GrammarProvider>>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one under the same name.
    pub fn register(&mut self, name: impl Into<SmolStr>, provider: Arc<dyn GrammarProvider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn GrammarProvider>, GrammarError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| GrammarError::Unavailable(SmolStr::new(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered language names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(SmolStr::as_str)
    }
}

impl fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarRegistry")
            .field("languages", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_grammar_is_unavailable() {
        let registry = GrammarRegistry::new();
        let err = registry.get("minizinc").err();
        assert_eq!(err, Some(GrammarError::Unavailable("minizinc".into())));
        assert_eq!(
            GrammarError::Unavailable("minizinc".into()).to_string(),
            "grammar unavailable: minizinc"
        );
    }
}
