use std::collections::BTreeMap;

use super::Value;

/// The field groups populated from the remote scan-management service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Variable,
    PerformanceIndicator,
}

impl FieldGroup {
    pub const ALL: [Self; 2] = [Self::Variable, Self::PerformanceIndicator];

    /// Group name in the evaluation context.
    pub fn name(self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::PerformanceIndicator => "performance-indicator",
        }
    }

    /// Identifier used for this group inside expressions.
    pub fn binding(self) -> &'static str {
        match self {
            Self::Variable => "var",
            Self::PerformanceIndicator => "pi",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Variable => "Variable value by name",
            Self::PerformanceIndicator => "Performance indicator value by name",
        }
    }

    pub fn from_binding(ident: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.binding() == ident || g.name() == ident)
    }
}

/// Map an expression identifier to its context group name.
///
/// Identifiers that are not a known binding are used verbatim, so callers may
/// add their own groups to a context.
pub(crate) fn canonical_group(ident: &str) -> String {
    FieldGroup::from_binding(ident)
        .map(|g| g.name().to_string())
        .unwrap_or_else(|| ident.to_string())
}

/// Per-pass data an expression is evaluated against: group name to
/// (field name to value). Built fresh for every metrics pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    groups: BTreeMap<String, BTreeMap<String, Value>>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) a group with the given fields.
    pub fn with_group<K, V>(mut self, group: &str, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let entry = self.groups.entry(group.to_string()).or_default();
        entry.extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn insert(&mut self, group: &str, field: impl Into<String>, value: impl Into<Value>) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(field.into(), value.into());
    }

    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, Value>> {
        self.groups.get(group)
    }

    pub fn lookup(&self, group: &str, field: &str) -> Option<&Value> {
        self.groups.get(group).and_then(|fields| fields.get(field))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeMap::is_empty)
    }
}
