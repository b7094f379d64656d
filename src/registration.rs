//! The registration request handed to the host integration layer: metrics,
//! the rule repository, and the default quality profile.

use serde::Serialize;

use crate::expr::docs;
use crate::metrics::{MetricDefinition, MetricsConfig, ValueType};
use crate::rules::{
    build_catalog_for, QualityProfile, RuleCatalog, RuleDescriptor, REPOSITORY_KEY,
    REPOSITORY_NAME,
};
use crate::source::DataSource;
use crate::taxonomy::ExternalMetadata;

/// A metric as the host registers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    pub key: String,
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
    /// 1 = higher is better, -1 = lower is better, 0 = neutral.
    pub direction: i32,
    pub qualitative: bool,
    pub domain: String,
}

impl From<&MetricDefinition> for MetricDescriptor {
    fn from(def: &MetricDefinition) -> Self {
        Self {
            key: def.key.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            value_type: def.value_type,
            direction: def.direction.host_value(),
            qualitative: def.qualitative,
            domain: def.domain.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRepository {
    pub key: String,
    pub name: String,
    pub rules: Vec<RuleDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    /// External list the rules come from, `None` for catch-all only.
    pub rules_source: Option<String>,
    pub metrics: Vec<MetricDescriptor>,
    pub repository: RuleRepository,
    pub profile: QualityProfile,
    /// HTML describing the fields available to metric expressions.
    pub expression_help: String,
}

impl RegistrationRequest {
    pub fn rule_keys(&self) -> impl Iterator<Item = &str> {
        self.repository.rules.iter().map(|r| r.key.as_str())
    }
}

/// Assemble everything the host needs to register.
pub fn build(
    config: &MetricsConfig,
    metadata: Option<&ExternalMetadata>,
    rules_source: &str,
    source: &dyn DataSource,
) -> RegistrationRequest {
    let catalog = build_catalog_for(rules_source, metadata);
    from_catalog(config, &catalog, source)
}

pub fn from_catalog(
    config: &MetricsConfig,
    catalog: &RuleCatalog,
    source: &dyn DataSource,
) -> RegistrationRequest {
    RegistrationRequest {
        rules_source: catalog.active_list().map(str::to_string),
        metrics: config.metrics().iter().map(MetricDescriptor::from).collect(),
        repository: RuleRepository {
            key: REPOSITORY_KEY.to_string(),
            name: REPOSITORY_NAME.to_string(),
            rules: catalog.rules().to_vec(),
        },
        profile: catalog.default_profile(),
        expression_help: docs::render(&source.fields(), &source.examples()),
    }
}
