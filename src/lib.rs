//! fortify-bridge: Fortify SSC results on a code-quality host.
//!
//! Declares metrics in YAML, evaluates them as small expressions over the
//! variables and performance indicators of an application version, and
//! generates a rule repository from an external category list.
//!
//! # Quick Start
//!
//! ```no_run
//! use fortifybridge::{Bridge, BridgeOptions};
//! use fortifybridge::source::SscExportSource;
//!
//! let bridge = Bridge::load(&BridgeOptions::default()).unwrap();
//! let source = SscExportSource::new("./ssc-export");
//! let pass = bridge.evaluate(&source, "1.0").unwrap();
//! println!("Measures: {}, Failures: {}", pass.measures.len(), pass.failures.len());
//! ```

pub mod config;
pub mod error;
pub mod expr;
pub mod metrics;
pub mod output;
pub mod registration;
pub mod rules;
pub mod source;
pub mod taxonomy;

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use config::{Settings, SETTINGS_FILE};
use error::Result;
use metrics::{MetricsConfig, MetricsPass};
use registration::RegistrationRequest;
use rules::RuleCatalog;
use source::DataSource;
use taxonomy::ExternalMetadata;

static SHARED: OnceCell<Bridge> = OnceCell::new();

/// Options for loading a bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeOptions {
    /// Path to the settings file (defaults to `.fortify-bridge.toml` in the
    /// working directory).
    pub settings_path: Option<PathBuf>,
    /// CLI override for the rules source selection.
    pub rules_source_override: Option<String>,
}

/// Loaded, read-only bridge state: settings, metric definitions and the
/// external taxonomy.
#[derive(Debug, Clone)]
pub struct Bridge {
    settings: Settings,
    metrics: Arc<MetricsConfig>,
    taxonomy: Option<Arc<ExternalMetadata>>,
    rules_source_override: Option<String>,
}

impl Bridge {
    /// Load everything from disk, bypassing the process-wide cache.
    pub fn load(options: &BridgeOptions) -> Result<Self> {
        let settings_path = options
            .settings_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
        let settings = Settings::load(&settings_path)?;

        let metrics = match settings.metrics_path() {
            Some(path) => MetricsConfig::load(&path)?,
            None => MetricsConfig::builtin()?,
        };

        let taxonomy = match settings.taxonomy_path() {
            Some(path) => ExternalMetadata::load(&path)?,
            None => None,
        };

        tracing::debug!(
            metrics = metrics.len(),
            origin = metrics.origin(),
            taxonomy = taxonomy.is_some(),
            "bridge loaded"
        );

        Ok(Self {
            settings,
            metrics: Arc::new(metrics),
            taxonomy: taxonomy.map(Arc::new),
            rules_source_override: options.rules_source_override.clone(),
        })
    }

    /// The process-wide bridge, loaded on first use.
    ///
    /// Options are only consulted by the first successful call. A failed
    /// load is not cached.
    pub fn shared(options: &BridgeOptions) -> Result<&'static Bridge> {
        SHARED.get_or_try_init(|| Self::load(options))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn metrics(&self) -> &MetricsConfig {
        &self.metrics
    }

    pub fn taxonomy(&self) -> Option<&ExternalMetadata> {
        self.taxonomy.as_deref()
    }

    /// Effective rules source: CLI override, then settings, then the
    /// metrics document.
    pub fn rules_source(&self) -> &str {
        self.rules_source_override
            .as_deref()
            .or_else(|| self.settings.rules_source())
            .unwrap_or_else(|| self.metrics.rules_source())
    }

    pub fn catalog(&self) -> RuleCatalog {
        rules::build_catalog_for(self.rules_source(), self.taxonomy())
    }

    pub fn registration(&self, source: &dyn DataSource) -> RegistrationRequest {
        registration::from_catalog(&self.metrics, &self.catalog(), source)
    }

    /// Fetch a fresh context for `version` and evaluate every metric.
    pub fn evaluate(&self, source: &dyn DataSource, version: &str) -> Result<MetricsPass> {
        let context = source.fetch(version)?;
        tracing::debug!(source = source.name(), version, "evaluating metrics");
        Ok(metrics::evaluate_all(self.metrics.metrics(), &context))
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::expr::MeasureValue;
    use crate::rules::{HostSeverity, IssueMapper, Vulnerability};
    use crate::source::SscExportSource;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const FIXTURES: &str = "tests/fixtures";

    fn options() -> BridgeOptions {
        BridgeOptions {
            settings_path: Some(Path::new(FIXTURES).join(SETTINGS_FILE)),
            rules_source_override: None,
        }
    }

    fn export() -> SscExportSource {
        SscExportSource::new(Path::new(FIXTURES).join("ssc-export"))
    }

    #[test]
    fn fixture_settings_load_metrics_and_taxonomy() {
        let bridge = Bridge::load(&options()).unwrap();
        assert_eq!(bridge.metrics().len(), 5);
        assert!(bridge.taxonomy().is_some());
        assert_eq!(bridge.rules_source(), "Sample List");
    }

    #[test]
    fn catalog_follows_selected_list() {
        let bridge = Bridge::load(&options()).unwrap();
        let keys: Vec<String> = bridge.catalog().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["CAT-1", "CAT-2", "CAT-3", "other"]);
    }

    #[test]
    fn override_selects_other_list() {
        let opts = BridgeOptions {
            rules_source_override: Some("CWE".into()),
            ..options()
        };
        let bridge = Bridge::load(&opts).unwrap();
        let keys: Vec<String> = bridge.catalog().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["CWE-79", "CWE-89", "other"]);
    }

    #[test]
    fn unknown_override_degrades_to_catch_all() {
        let opts = BridgeOptions {
            rules_source_override: Some("CWE Top 26".into()),
            ..options()
        };
        let bridge = Bridge::load(&opts).unwrap();
        let keys: Vec<String> = bridge.catalog().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["other"]);
    }

    #[test]
    fn loading_twice_is_identical() {
        let a = Bridge::load(&options()).unwrap();
        let b = Bridge::load(&options()).unwrap();
        assert_eq!(a.metrics(), b.metrics());
        assert_eq!(a.catalog(), b.catalog());
    }

    #[test]
    fn evaluate_fixture_version() {
        let bridge = Bridge::load(&options()).unwrap();
        let pass = bridge.evaluate(&export(), "1.0").unwrap();

        assert_eq!(
            pass.measure("fortify.security.rating").unwrap().value,
            MeasureValue::Float(4.5)
        );
        assert_eq!(
            pass.measure("fortify.issues.critical_high").unwrap().value,
            MeasureValue::Int(8)
        );
        assert_eq!(
            pass.measure("fortify.security.rating_grade").unwrap().value,
            MeasureValue::Rating(2)
        );
        assert_eq!(
            pass.measure("fortify.scanner").unwrap().value,
            MeasureValue::Text("SCA".into())
        );
        assert!(pass.failure("fortify.issues.suppressed").is_some());
        assert_eq!(pass.measures.len(), 4);
    }

    #[test]
    fn missing_version_is_context_unavailable() {
        let bridge = Bridge::load(&options()).unwrap();
        let err = bridge.evaluate(&export(), "9.9").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn registration_lists_fixture_rules() {
        let bridge = Bridge::load(&options()).unwrap();
        let request = bridge.registration(&export());
        assert_eq!(request.rules_source.as_deref(), Some("Sample List"));
        assert_eq!(request.repository.rules.len(), 4);
        assert!(request.repository.rules.iter().all(|r| r.activated_by_default));
        assert_eq!(request.profile.active_rules.len(), 4);
    }

    #[test]
    fn fixture_issues_map_to_rules() {
        let bridge = Bridge::load(&options()).unwrap();
        let catalog = bridge.catalog();
        let content = std::fs::read_to_string(Path::new(FIXTURES).join("issues.json")).unwrap();
        let vulns: Vec<Vulnerability> = serde_json::from_str(&content).unwrap();
        let issues = IssueMapper::new(&catalog).map_all(&vulns);

        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].rule_key, "CAT-1");
        assert_eq!(issues[0].severity, HostSeverity::Blocker);
        assert_eq!(issues[1].rule_key, "CAT-3");
        assert_eq!(issues[1].severity, HostSeverity::Minor);
        assert_eq!(issues[2].rule_key, "other");
    }

    #[test]
    fn missing_settings_use_builtin_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let opts = BridgeOptions {
            settings_path: Some(dir.path().join(SETTINGS_FILE)),
            rules_source_override: None,
        };
        let bridge = Bridge::load(&opts).unwrap();
        assert!(bridge.metrics().get("fortify.ssc.security.rating").is_some());
        assert!(bridge.taxonomy().is_none());
        assert_eq!(bridge.catalog().keys().collect::<Vec<_>>(), vec!["other"]);
    }

    #[test]
    fn shared_returns_same_instance() {
        let a = Bridge::shared(&options()).unwrap();
        let b = Bridge::shared(&BridgeOptions::default()).unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
