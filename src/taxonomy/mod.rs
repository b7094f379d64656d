//! External vulnerability category taxonomies (CWE, OWASP Top 10, ...).
//!
//! A taxonomy document holds several named lists; exactly one of them is
//! selected per deployment to drive rule generation. Category ids only need
//! to be unique within their own list, because each id becomes a rule key.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// One entry of an external list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCategory {
    /// Stable id, used as the rule key.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A named, ordered collection of categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalList {
    name: String,
    description: Option<String>,
    categories: Vec<ExternalCategory>,
}

impl ExternalList {
    /// Build a list, rejecting duplicate category ids.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        categories: Vec<ExternalCategory>,
    ) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.id.as_str()) {
                return Err(BridgeError::DuplicateCategoryId {
                    list: name,
                    id: category.id.clone(),
                });
            }
        }
        Ok(Self {
            name,
            description,
            categories,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Categories in source order.
    pub fn categories(&self) -> &[ExternalCategory] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&ExternalCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetadata {
    lists: Vec<RawList>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawList {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Vec<ExternalCategory>,
}

/// All external lists published by the scan-management service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalMetadata {
    lists: BTreeMap<String, ExternalList>,
}

impl ExternalMetadata {
    /// Parse a taxonomy JSON document.
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_from(content, "<taxonomy>")
    }

    /// Parse a taxonomy JSON document. `origin` names the source in errors.
    fn parse_from(content: &str, origin: &str) -> Result<Self> {
        let raw: RawMetadata = serde_json::from_str(content)
            .map_err(|e| BridgeError::config(origin, e.to_string()))?;
        let mut lists = BTreeMap::new();
        for raw_list in raw.lists {
            let list = ExternalList::new(raw_list.name, raw_list.description, raw_list.categories)?;
            if lists.contains_key(list.name()) {
                return Err(BridgeError::config(
                    origin,
                    format!("duplicate external list name '{}'", list.name()),
                ));
            }
            lists.insert(list.name().to_string(), list);
        }
        tracing::debug!(lists = lists.len(), "loaded external metadata");
        Ok(Self { lists })
    }

    /// Load a taxonomy file. Returns `None` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no external metadata file");
            return Ok(None);
        }
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config(&origin, format!("cannot read file: {e}")))?;
        Self::parse_from(&content, &origin).map(Some)
    }

    pub fn list_by_name(&self, name: &str) -> Option<&ExternalList> {
        self.lists.get(name)
    }

    /// Names of all available lists, for selection UIs.
    pub fn list_names(&self) -> BTreeSet<&str> {
        self.lists.keys().map(String::as_str).collect()
    }

    pub fn lists(&self) -> impl Iterator<Item = &ExternalList> {
        self.lists.values()
    }

    /// The list name closest to `name`, if it is within a few edits.
    pub fn closest_name(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.lists
            .keys()
            .map(|candidate| {
                let distance = levenshtein::levenshtein(&wanted, &candidate.to_lowercase());
                (distance, candidate.as_str())
            })
            .filter(|&(distance, _)| distance <= 3)
            .min()
            .map(|(_, candidate)| candidate)
    }
}
