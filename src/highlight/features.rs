//! Enabled feature tiers, grouped into priority levels.

use smol_str::SmolStr;

/// Levels of feature names and the highest enabled level.
///
/// Level 1 is the first entry of `levels`. A feature's priority is the index
/// of the level that lists it; earlier levels win overlaps. Features enabled
/// explicitly but listed in no level rank after every level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSet {
    levels: Vec<Vec<SmolStr>>,
    level: usize,
    added: Vec<SmolStr>,
    removed: Vec<SmolStr>,
}

impl FeatureSet {
    pub fn new(levels: Vec<Vec<SmolStr>>, level: usize) -> Self {
        Self {
            levels,
            level,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// The four MiniZinc levels, with the first three enabled.
    pub fn minizinc() -> Self {
        let level = |names: &[&'static str]| -> Vec<SmolStr> {
            names.iter().map(|n| SmolStr::new_static(*n)).collect()
        };
        Self::new(
            vec![
                level(&["comment", "definition"]),
                level(&["keyword", "string", "type"]),
                level(&["builtin", "constant", "number", "annotation"]),
                level(&["bracket", "delimiter", "function", "operator", "variable"]),
            ],
            3,
        )
    }

    pub fn levels(&self) -> &[Vec<SmolStr>] {
        &self.levels
    }

    /// Highest enabled level, 1-based; 0 enables no level.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn set_level(&mut self, level: usize) {
        self.level = level;
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Enable a feature regardless of the current level.
    pub fn enable(&mut self, feature: impl Into<SmolStr>) {
        let feature = feature.into();
        self.removed.retain(|f| *f != feature);
        if !self.added.contains(&feature) {
            self.added.push(feature);
        }
    }

    /// Disable a feature regardless of the current level.
    pub fn disable(&mut self, feature: impl Into<SmolStr>) {
        let feature = feature.into();
        self.added.retain(|f| *f != feature);
        if !self.removed.contains(&feature) {
            self.removed.push(feature);
        }
    }

    fn listed_level(&self, feature: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|names| names.iter().any(|n| n == feature))
    }

    /// Priority of an enabled feature (lower wins), or `None` when disabled.
    pub fn priority(&self, feature: &str) -> Option<usize> {
        if self.removed.iter().any(|f| f == feature) {
            return None;
        }
        match self.listed_level(feature) {
            Some(index) if index < self.level => Some(index),
            listed => self
                .added
                .iter()
                .any(|f| f == feature)
                .then(|| listed.unwrap_or(self.levels.len())),
        }
    }

    pub fn is_enabled(&self, feature: &str) -> bool {
        self.priority(feature).is_some()
    }

    /// Every enabled feature, in priority order.
    pub fn enabled(&self) -> Vec<SmolStr> {
        let mut enabled: Vec<SmolStr> = self
            .levels
            .iter()
            .flatten()
            .chain(&self.added)
            .filter(|f| self.is_enabled(f))
            .cloned()
            .collect();
        let mut seen = Vec::new();
        enabled.retain(|f| {
            let fresh = !seen.contains(f);
            seen.push(f.clone());
            fresh
        });
        enabled.sort_by_key(|f| self.priority(f));
        enabled
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::minizinc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_enables_first_three() {
        let features = FeatureSet::minizinc();
        assert_eq!(features.priority("comment"), Some(0));
        assert_eq!(features.priority("keyword"), Some(1));
        assert_eq!(features.priority("number"), Some(2));
        assert_eq!(features.priority("variable"), None);
        assert!(!features.is_enabled("unknown"));
    }

    #[test]
    fn test_level_changes_enabled_set() {
        let features = FeatureSet::minizinc().with_level(4);
        assert_eq!(features.priority("variable"), Some(3));
        let features = features.with_level(1);
        assert_eq!(features.enabled(), vec!["comment", "definition"]);
    }

    #[test]
    fn test_explicit_add_and_remove() {
        let mut features = FeatureSet::minizinc().with_level(1);
        features.enable("variable");
        features.enable("extra");
        features.disable("comment");

        assert_eq!(features.priority("variable"), Some(3));
        assert_eq!(features.priority("extra"), Some(4));
        assert_eq!(features.priority("comment"), None);
        assert_eq!(features.enabled(), vec!["definition", "variable", "extra"]);

        features.enable("comment");
        assert_eq!(features.priority("comment"), Some(0));
    }
}
