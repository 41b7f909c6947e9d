//! Highlight resolution: query captures become one style tag per byte.
//!
//! ```text
//! Tree ──execute──▶ [Capture] ──resolve(FeatureSet)──▶ [StyleRange]
//! ```

mod features;
mod resolve;
mod rules;

pub use features::FeatureSet;
pub use resolve::{StyleRange, resolve};
pub use rules::minizinc_rules;

use crate::base::TextRange;
use crate::query::{CompiledQuerySet, QueryError, QueryRule};
use crate::tree::{Grammar, Tree};

/// A compiled rule table together with the enabled features.
#[derive(Clone, Debug)]
pub struct Highlighter {
    queries: CompiledQuerySet,
    features: FeatureSet,
}

impl Highlighter {
    pub fn new(
        grammar: &Grammar,
        rules: &[QueryRule],
        features: FeatureSet,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            queries: CompiledQuerySet::compile(grammar, rules)?,
            features,
        })
    }

    /// The built-in MiniZinc rules and levels.
    pub fn minizinc() -> Result<Self, QueryError> {
        Self::new(&crate::syntax::grammar(), &minizinc_rules(), FeatureSet::minizinc())
    }

    pub fn queries(&self) -> &CompiledQuerySet {
        &self.queries
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn set_features(&mut self, features: FeatureSet) {
        self.features = features;
    }

    /// Style ranges partitioning `region` of `tree`.
    pub fn highlight(&self, tree: &Tree, region: TextRange) -> Vec<StyleRange> {
        let captures = self.queries.execute(&tree.root(), region);
        resolve(&captures, &self.features, region)
    }
}
