use serde::{Deserialize, Serialize};

use super::{RuleCatalog, REPOSITORY_KEY};

pub const DEFAULT_PROFILE_NAME: &str = "Fortify Way";

/// A rule activation in a quality profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRule {
    pub repository_key: String,
    pub rule_key: String,
}

/// Quality profile registered alongside the rule repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub name: String,
    pub active_rules: Vec<ActiveRule>,
}

impl QualityProfile {
    /// Activate exactly the rules of the catalog that are activated by default.
    pub fn from_catalog(catalog: &RuleCatalog) -> Self {
        let active_rules = catalog
            .rules()
            .iter()
            .filter(|r| r.activated_by_default)
            .map(|r| ActiveRule {
                repository_key: REPOSITORY_KEY.to_string(),
                rule_key: r.key.clone(),
            })
            .collect();
        Self {
            name: DEFAULT_PROFILE_NAME.to_string(),
            active_rules,
        }
    }

    pub fn is_active(&self, rule_key: &str) -> bool {
        self.active_rules.iter().any(|r| r.rule_key == rule_key)
    }

    pub fn rule_keys(&self) -> impl Iterator<Item = &str> {
        self.active_rules.iter().map(|r| r.rule_key.as_str())
    }
}
