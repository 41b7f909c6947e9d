//! The built-in MiniZinc grammar provider.
//!
//! ```text
//! text → lexer (logos) → parser (rowan green tree) → tree::Tree
//! ```
//!
//! The schema in [`schema`] names every kind and field so that highlight
//! queries and indentation rules can refer to them.

mod kind;
mod lexer;
mod parser;
mod schema;

use std::sync::Arc;

pub use kind::SyntaxKind;
pub use lexer::{Lexeme, lex};
pub use parser::{Parse, parse};
pub use schema::grammar;

use crate::tree::{Grammar, GrammarProvider, GrammarRegistry, Tree};

/// Registry name of the built-in provider.
pub const LANGUAGE: &str = "minizinc";

/// The MiniZinc grammar provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniZinc;

impl GrammarProvider for MiniZinc {
    fn grammar(&self) -> Arc<Grammar> {
        schema::grammar()
    }

    fn parse(&self, text: &str) -> Tree {
        let Parse { green, errors } = parser::parse(text);
        Tree::new(schema::grammar(), green, text, errors)
    }
}

/// Register the MiniZinc provider under [`LANGUAGE`].
pub fn register(registry: &mut GrammarRegistry) {
    registry.register(LANGUAGE, Arc::new(MiniZinc));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TextEdit;

    #[test]
    fn test_registered_provider_parses() {
        let mut registry = GrammarRegistry::new();
        register(&mut registry);

        let provider = registry.get(LANGUAGE).unwrap();
        let tree = provider.parse("int: n;");
        assert_eq!(tree.grammar().name(), "minizinc");
        assert_eq!(tree.root().kind_name(), "source_file");
    }

    #[test]
    fn test_reparse_produces_new_snapshot() {
        let old = MiniZinc.parse("int: n = 1;");
        let edit = TextEdit::replace(crate::base::TextRange::new(9.into(), 10.into()), "42");
        let new = MiniZinc.reparse(&old, &edit);

        assert_eq!(old.text(), "int: n = 1;");
        assert_eq!(new.text(), "int: n = 42;");
        assert!(new.errors().is_empty());
    }
}
