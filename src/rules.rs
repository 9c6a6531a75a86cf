//! Merging of global and per-file loading rules

use crate::types::RuleSet;

impl RuleSet {
    /// Shallow merge where `overrides` wins for every rule kind it defines.
    ///
    /// Parameter values are not validated here.
    pub fn merged_with(&self, overrides: &RuleSet) -> RuleSet {
        let mut merged = self.clone();
        for rule in overrides.iter() {
            merged.insert(*rule);
        }
        merged
    }
}

/// Effective rules for one file given the global configuration.
pub fn resolve_rules(global: &RuleSet, file: &RuleSet) -> RuleSet {
    global.merged_with(file)
}
