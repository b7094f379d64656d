use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::DataSource;
use crate::error::{BridgeError, Result};
use crate::expr::docs::{ExpressionExample, FieldDoc};
use crate::expr::{EvaluationContext, FieldGroup, Value};

pub const VARIABLES_FILE: &str = "variableHistories.json";
pub const PERFORMANCE_INDICATORS_FILE: &str = "performanceIndicatorHistories.json";

/// SSC API list envelope: `{"data": [...], "count": n}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: Vec<NamedValue>,
}

#[derive(Debug, Deserialize)]
struct NamedValue {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}

/// Reads SSC API responses saved to disk, one directory per application
/// version:
///
/// ```text
/// <root>/<version>/variableHistories.json
/// <root>/<version>/performanceIndicatorHistories.json
/// ```
#[derive(Debug, Clone)]
pub struct SscExportSource {
    root: PathBuf,
}

impl SscExportSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_group(
        &self,
        version: &str,
        file: &str,
        group: FieldGroup,
        context: &mut EvaluationContext,
    ) -> Result<()> {
        let path = self.root.join(version).join(file);
        let unavailable = |message: String| BridgeError::ContextUnavailable {
            version: version.to_string(),
            message,
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("cannot read {}: {e}", path.display())))?;
        let envelope: Envelope = serde_json::from_str(&content)
            .map_err(|e| unavailable(format!("invalid response in {}: {e}", path.display())))?;

        for entry in envelope.data {
            match Value::from_json(&entry.value) {
                Some(value) => context.insert(group.name(), entry.name, value),
                None => tracing::debug!(
                    group = group.name(),
                    field = %entry.name,
                    "skipping field without a scalar value"
                ),
            }
        }
        Ok(())
    }
}

impl DataSource for SscExportSource {
    fn name(&self) -> &str {
        "Fortify SSC export"
    }

    fn fields(&self) -> Vec<FieldDoc> {
        super::ssc_fields()
    }

    fn examples(&self) -> Vec<ExpressionExample> {
        super::ssc_examples()
    }

    fn fetch(&self, version: &str) -> Result<EvaluationContext> {
        let mut context = EvaluationContext::new();
        self.read_group(version, VARIABLES_FILE, FieldGroup::Variable, &mut context)?;
        self.read_group(
            version,
            PERFORMANCE_INDICATORS_FILE,
            FieldGroup::PerformanceIndicator,
            &mut context,
        )?;
        tracing::debug!(version, "loaded evaluation context from export");
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_export(root: &Path, version: &str, variables: &str, indicators: &str) {
        let dir = root.join(version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(VARIABLES_FILE), variables).unwrap();
        std::fs::write(dir.join(PERFORMANCE_INDICATORS_FILE), indicators).unwrap();
    }

    #[test]
    fn fetch_builds_both_groups() {
        let tmp = tempfile::tempdir().unwrap();
        write_export(
            tmp.path(),
            "10042",
            r#"{"data": [{"name": "CFPO", "value": 3}, {"name": "HFPO", "value": 5},
                        {"name": "UNSET", "value": null}], "count": 3}"#,
            r#"{"data": [{"name": "Fortify Security Rating", "value": 4.5}], "count": 1}"#,
        );

        let source = SscExportSource::new(tmp.path());
        let ctx = source.fetch("10042").unwrap();
        assert_eq!(ctx.lookup("variable", "CFPO"), Some(&Value::Number(3.0)));
        assert_eq!(
            ctx.lookup("performance-indicator", "Fortify Security Rating"),
            Some(&Value::Number(4.5))
        );
        assert_eq!(ctx.lookup("variable", "UNSET"), None);
    }

    #[test]
    fn missing_version_is_context_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SscExportSource::new(tmp.path()).fetch("404").unwrap_err();
        assert!(matches!(err, BridgeError::ContextUnavailable { ref version, .. } if version == "404"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn malformed_response_is_context_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        write_export(tmp.path(), "1", "<html>login</html>", r#"{"data": []}"#);
        let err = SscExportSource::new(tmp.path()).fetch("1").unwrap_err();
        assert!(matches!(err, BridgeError::ContextUnavailable { .. }));
    }

    #[test]
    fn documents_ssc_fields() {
        let source = SscExportSource::new(".");
        let names: Vec<String> = source.fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["var", "pi"]);
        assert!(!source.examples().is_empty());
    }
}
