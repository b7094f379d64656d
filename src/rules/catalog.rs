use serde::Serialize;

use super::{QualityProfile, RuleDescriptor, OTHER_RULE_KEY, SINGLE_RULE_SOURCE};
use crate::error::{BridgeError, Result};
use crate::metrics::MetricsConfig;
use crate::taxonomy::{ExternalList, ExternalMetadata};

/// The materialized rule set: one rule per category of the active external
/// list, in list order, followed by the catch-all rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCatalog {
    active_list: Option<String>,
    rules: Vec<RuleDescriptor>,
}

impl RuleCatalog {
    /// Name of the external list the rules were generated from, if any.
    pub fn active_list(&self) -> Option<&str> {
        self.active_list.as_deref()
    }

    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|r| r.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Default quality profile: every rule in the catalog, activated.
    pub fn default_profile(&self) -> QualityProfile {
        QualityProfile::from_catalog(self)
    }

    /// Rule key for a finding tagged with the given category ids: the first
    /// id present in the catalog, otherwise the catch-all key.
    pub fn rule_key_for<'a>(&'a self, category_ids: &[String]) -> &'a str {
        category_ids
            .iter()
            .filter(|id| id.as_str() != OTHER_RULE_KEY)
            .find_map(|id| self.get(id).map(|r| r.key.as_str()))
            .unwrap_or(OTHER_RULE_KEY)
    }
}

/// Build the catalog for the rules source named in the metrics document.
pub fn build_catalog(config: &MetricsConfig, metadata: Option<&ExternalMetadata>) -> RuleCatalog {
    build_catalog_for(config.rules_source(), metadata)
}

/// Build the catalog for an explicit rules source selection.
///
/// An unresolvable selection never fails: the catalog then holds only the
/// catch-all rule.
pub fn build_catalog_for(rules_source: &str, metadata: Option<&ExternalMetadata>) -> RuleCatalog {
    let active = match select_list(rules_source, metadata) {
        Ok(list) => list,
        Err(e) => {
            let suggestion = metadata.and_then(|m| m.closest_name(rules_source));
            tracing::warn!(
                error = %e,
                suggestion = suggestion.unwrap_or("-"),
                "falling back to the catch-all rule only"
            );
            None
        }
    };

    let mut rules = Vec::with_capacity(active.map_or(0, ExternalList::len) + 1);
    if let Some(list) = active {
        for category in list.categories() {
            if category.id == OTHER_RULE_KEY {
                tracing::debug!(list = list.name(), "category id collides with catch-all rule, skipping");
                continue;
            }
            rules.push(RuleDescriptor::from_category(category));
        }
    }
    rules.push(RuleDescriptor::catch_all());

    tracing::debug!(
        active_list = active.map(ExternalList::name).unwrap_or("-"),
        rules = rules.len(),
        "built rule catalog"
    );

    RuleCatalog {
        active_list: active.map(|l| l.name().to_string()),
        rules,
    }
}

/// Resolve the active external list. `Ok(None)` means no taxonomy is in use.
fn select_list<'a>(
    rules_source: &str,
    metadata: Option<&'a ExternalMetadata>,
) -> Result<Option<&'a ExternalList>> {
    let name = rules_source.trim();
    if name.is_empty() || name == SINGLE_RULE_SOURCE {
        return Ok(None);
    }
    let Some(metadata) = metadata else {
        tracing::debug!(rules_source = name, "no external metadata available");
        return Ok(None);
    };
    metadata
        .list_by_name(name)
        .map(Some)
        .ok_or_else(|| BridgeError::UnknownTaxonomyName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn metadata() -> ExternalMetadata {
        ExternalMetadata::parse(
            r#"{"lists": [
                {"name": "Test", "categories": [
                    {"id": "CAT-1", "name": "Category one", "description": "First"},
                    {"id": "CAT-2", "name": "Category two", "description": "Second"}
                ]},
                {"name": "Colliding", "categories": [
                    {"id": "other", "name": "Other"},
                    {"id": "CAT-9", "name": "Nine"}
                ]}
            ]}"#,
        )
        .unwrap()
    }

    fn keys(catalog: &RuleCatalog) -> Vec<&str> {
        catalog.keys().collect()
    }

    #[test]
    fn known_list_plus_catch_all() {
        let md = metadata();
        let catalog = build_catalog_for("Test", Some(&md));
        assert_eq!(keys(&catalog), vec!["CAT-1", "CAT-2", "other"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.rules().iter().all(|r| r.activated_by_default));
        assert_eq!(catalog.active_list(), Some("Test"));
        assert_eq!(catalog.get("CAT-2").unwrap().name, "Category two");
    }

    #[test]
    fn unresolvable_selection_is_catch_all_only() {
        let md = metadata();
        for (source, md_opt) in [
            ("single", Some(&md)),
            ("", Some(&md)),
            ("   ", Some(&md)),
            ("Unknown list", Some(&md)),
            ("Test", None),
        ] {
            let catalog = build_catalog_for(source, md_opt);
            assert_eq!(keys(&catalog), vec!["other"], "source '{source}'");
            assert_eq!(catalog.active_list(), None);
        }
    }

    #[test]
    fn other_is_never_duplicated() {
        let md = metadata();
        let catalog = build_catalog_for("Colliding", Some(&md));
        assert_eq!(keys(&catalog), vec!["CAT-9", "other"]);
    }

    #[test]
    fn catalog_from_config_selection() {
        let md = metadata();
        let config = MetricsConfig::parse("rules_source: Test\nmetrics: []", "test").unwrap();
        assert_eq!(keys(&build_catalog(&config, Some(&md))), vec!["CAT-1", "CAT-2", "other"]);
    }

    #[test]
    fn unknown_name_is_reported_by_selection() {
        let md = metadata();
        let err = select_list("Tset", Some(&md)).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownTaxonomyName(ref n) if n == "Tset"));
    }

    #[test]
    fn rule_key_for_prefers_catalog_ids() {
        let md = metadata();
        let catalog = build_catalog_for("Test", Some(&md));
        assert_eq!(catalog.rule_key_for(&["CWE-79".to_string(), "CAT-2".to_string()]), "CAT-2");
        assert_eq!(catalog.rule_key_for(&["CWE-79".to_string()]), "other");
        assert_eq!(catalog.rule_key_for(&[]), "other");
    }

    proptest! {
        #[test]
        fn catalog_is_ids_plus_other(ids in proptest::collection::btree_set("[A-Z]{2,4}-[0-9]{1,3}", 0..20)) {
            let categories: Vec<String> = ids
                .iter()
                .map(|id| format!(r#"{{"id": "{id}", "name": "{id}"}}"#))
                .collect();
            let doc = format!(r#"{{"lists": [{{"name": "Gen", "categories": [{}]}}]}}"#, categories.join(","));
            let md = ExternalMetadata::parse(&doc).unwrap();

            let catalog = build_catalog_for("Gen", Some(&md));
            let mut expected: Vec<&str> = ids.iter().map(String::as_str).collect();
            expected.push(OTHER_RULE_KEY);
            prop_assert_eq!(keys(&catalog), expected);
            prop_assert_eq!(catalog.keys().filter(|k| *k == OTHER_RULE_KEY).count(), 1);
        }
    }
}
