use std::collections::{HashMap, HashSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{Direction, MetricDefinition, MetricSource, ValueType};
use crate::error::{BridgeError, Result};
use crate::expr::{Expression, Value};
use crate::rules::SINGLE_RULE_SOURCE;

static METRIC_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.:\-]+$").unwrap());

const DEFAULT_DOMAIN: &str = "Fortify";

const BUILTIN_METRICS: &str = include_str!("default_metrics.yml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    rules_source: Option<String>,
    #[serde(default)]
    metrics: Vec<RawMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetric {
    key: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    value_type: String,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    qualitative: bool,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    expr: Option<String>,
    #[serde(default)]
    value: Option<serde_yaml::Value>,
}

/// The loaded metric definitions plus the rules-source selection.
///
/// Immutable after load; definitions keep document order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    origin: String,
    rules_source: String,
    metrics: Vec<MetricDefinition>,
    index: HashMap<String, usize>,
}

impl MetricsConfig {
    /// Load and validate a metrics document from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::config(path.display().to_string(), format!("cannot read file: {e}"))
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// The metrics document embedded in the binary.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_METRICS, "<builtin>")
    }

    /// Parse a YAML metrics document. `origin` names the source in errors.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let raw: RawDocument = serde_yaml::from_str(content)
            .map_err(|e| BridgeError::config(origin, e.to_string()))?;

        let mut metrics = Vec::with_capacity(raw.metrics.len());
        let mut seen = HashSet::new();
        for raw_metric in raw.metrics {
            let def = convert(raw_metric, origin)?;
            if !seen.insert(def.key.clone()) {
                return Err(BridgeError::DuplicateKey(def.key));
            }
            metrics.push(def);
        }

        let index = metrics
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key.clone(), i))
            .collect();

        let rules_source = raw
            .rules_source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| SINGLE_RULE_SOURCE.to_string());

        tracing::debug!(origin, metrics = metrics.len(), %rules_source, "loaded metrics document");

        Ok(Self {
            origin: origin.to_string(),
            rules_source,
            metrics,
            index,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Name of the external list that supplies rules, or the single-rule sentinel.
    pub fn rules_source(&self) -> &str {
        &self.rules_source
    }

    pub fn metrics(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    pub fn get(&self, key: &str) -> Option<&MetricDefinition> {
        self.index.get(key).map(|&i| &self.metrics[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

fn convert(raw: RawMetric, origin: &str) -> Result<MetricDefinition> {
    let key = raw.key.trim().to_string();
    let invalid = |message: String| BridgeError::config(origin, format!("metric '{key}': {message}"));

    if !METRIC_KEY_RE.is_match(&key) {
        return Err(invalid(
            "key may only contain letters, digits, '_', '.', ':' and '-'".into(),
        ));
    }

    let value_type = ValueType::from_str_lenient(&raw.value_type).ok_or_else(|| {
        let supported: Vec<&str> = ValueType::ALL.iter().map(|t| t.host_name()).collect();
        invalid(format!(
            "unsupported type '{}' (expected one of {})",
            raw.value_type,
            supported.join(", ")
        ))
    })?;

    let direction = match raw.direction.as_deref() {
        None => Direction::None,
        Some(d) => Direction::from_str_lenient(d)
            .ok_or_else(|| invalid(format!("unsupported direction '{d}'")))?,
    };

    let source = match (raw.expr, raw.value) {
        (Some(expr), None) => MetricSource::Expression(
            Expression::parse(&expr).map_err(|e| invalid(e.to_string()))?,
        ),
        (None, Some(literal)) => MetricSource::Literal(
            Value::from_yaml(&literal)
                .ok_or_else(|| invalid("literal value must be a scalar".into()))?,
        ),
        (Some(_), Some(_)) => return Err(invalid("set either 'expr' or 'value', not both".into())),
        (None, None) => return Err(invalid("one of 'expr' or 'value' is required".into())),
    };

    Ok(MetricDefinition {
        key: key.clone(),
        name: raw.name,
        description: raw.description,
        value_type,
        direction,
        qualitative: raw.qualitative,
        domain: raw.domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const DOC: &str = r#"
rules_source: CWE
metrics:
  - key: fortify.ssc.security.rating
    name: Fortify Security Rating
    type: FLOAT
    direction: better
    qualitative: true
    expr: pi['Fortify Security Rating']
  - key: fortify.ssc.issues.critical
    name: Critical Issues
    type: INT
    direction: worse
    domain: Fortify Issues
    expr: var['CFPO']
  - key: fortify.ssc.application
    name: Application
    type: STRING
    value: WebGoat
"#;

    #[test]
    fn parses_document() {
        let cfg = MetricsConfig::parse(DOC, "test").unwrap();
        assert_eq!(cfg.rules_source(), "CWE");
        assert_eq!(
            cfg.keys().collect::<Vec<_>>(),
            vec![
                "fortify.ssc.security.rating",
                "fortify.ssc.issues.critical",
                "fortify.ssc.application"
            ]
        );

        let rating = cfg.get("fortify.ssc.security.rating").unwrap();
        assert_eq!(rating.value_type, ValueType::Float);
        assert_eq!(rating.direction, Direction::Better);
        assert!(rating.qualitative);
        assert_eq!(rating.domain, "Fortify");
        assert_eq!(
            rating.expression().map(Expression::source),
            Some("pi['Fortify Security Rating']")
        );

        let critical = cfg.get("fortify.ssc.issues.critical").unwrap();
        assert_eq!(critical.domain, "Fortify Issues");

        let app = cfg.get("fortify.ssc.application").unwrap();
        assert_eq!(app.source, MetricSource::Literal(Value::Text("WebGoat".into())));
        assert_eq!(app.direction, Direction::None);
    }

    #[test]
    fn rules_source_defaults_to_single() {
        let cfg = MetricsConfig::parse("metrics: []", "test").unwrap();
        assert_eq!(cfg.rules_source(), SINGLE_RULE_SOURCE);
        assert!(cfg.is_empty());

        let blank = MetricsConfig::parse("rules_source: '  '\nmetrics: []", "test").unwrap();
        assert_eq!(blank.rules_source(), SINGLE_RULE_SOURCE);
    }

    #[test]
    fn duplicate_key_rejected() {
        let doc = r#"
metrics:
  - { key: a, name: A, type: INT, value: 1 }
  - { key: a, name: A again, type: INT, value: 2 }
"#;
        let err = MetricsConfig::parse(doc, "test").unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateKey(ref k) if k == "a"));
    }

    #[test]
    fn unknown_type_rejected() {
        let doc = "metrics:\n  - { key: a, name: A, type: DECIMAL, value: 1 }\n";
        let err = MetricsConfig::parse(doc, "test").unwrap_err();
        assert!(matches!(err, BridgeError::ConfigLoad { .. }));
        assert!(err.to_string().contains("unsupported type 'DECIMAL'"));
    }

    #[test]
    fn invalid_definitions_rejected() {
        for doc in [
            "metrics:\n  - { key: 'bad key', name: A, type: INT, value: 1 }\n",
            "metrics:\n  - { key: a, name: A, type: INT }\n",
            "metrics:\n  - { key: a, name: A, type: INT, value: 1, expr: '1' }\n",
            "metrics:\n  - { key: a, name: A, type: INT, expr: 'var[' }\n",
            "metrics:\n  - { key: a, name: A, type: INT, value: [1, 2] }\n",
            "metrics:\n  - { key: a, name: A, type: INT, value: 1, direction: up }\n",
            "metrics:\n  - { key: a, name: A, type: INT, value: 1, colour: red }\n",
            "metrics: {",
        ] {
            let err = MetricsConfig::parse(doc, "test").unwrap_err();
            assert!(matches!(err, BridgeError::ConfigLoad { .. }), "{doc}: {err}");
        }
    }

    #[test]
    fn oversized_expressions_fail_to_load() {
        let nested = format!("{}1{}", "(".repeat(2_000), ")".repeat(2_000));
        let chain = vec!["var['CFPO']"; 50_000].join(" + ");
        for expr in [nested, chain] {
            let doc = format!("metrics:\n  - {{ key: a, name: A, type: INT, expr: \"{expr}\" }}\n");
            let err = MetricsConfig::parse(&doc, "test").unwrap_err();
            assert!(matches!(err, BridgeError::ConfigLoad { .. }));
            assert!(err.to_string().contains("Could not parse expression"));
        }
    }

    #[test]
    fn load_twice_is_identical() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();
        let first = MetricsConfig::load(file.path()).unwrap();
        let second = MetricsConfig::load(file.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MetricsConfig::load(&dir.path().join("metrics.yml")).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigLoad { .. }));
    }

    #[test]
    fn builtin_document_is_valid() {
        let cfg = MetricsConfig::builtin().unwrap();
        assert!(!cfg.is_empty());
        assert_eq!(cfg.rules_source(), SINGLE_RULE_SOURCE);
        assert!(cfg.get("fortify.ssc.security.rating").is_some());
    }
}
