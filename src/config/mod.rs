use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Default settings file name, looked up in the working directory.
pub const SETTINGS_FILE: &str = ".fortify-bridge.toml";

/// Top-level settings from `.fortify-bridge.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub rules: RulesSettings,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Where the declarative inputs live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sources {
    /// Metrics YAML document. The built-in definitions are used when unset.
    #[serde(default)]
    pub metrics: Option<PathBuf>,
    /// External taxonomy JSON document.
    #[serde(default)]
    pub taxonomy: Option<PathBuf>,
    /// Directory of saved SSC API responses.
    #[serde(default)]
    pub ssc_export: Option<PathBuf>,
}

/// Operator choices for rule generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    /// External list to generate rules from. Overrides `rules_source` in
    /// the metrics document.
    #[serde(default)]
    pub source: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file. Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config(&origin, format!("cannot read file: {e}")))?;
        let mut settings: Settings =
            toml::from_str(&content).map_err(|e| BridgeError::config(&origin, e.to_string()))?;
        settings.base_dir = path.parent().map(Path::to_path_buf);
        Ok(settings)
    }

    pub fn metrics_path(&self) -> Option<PathBuf> {
        self.resolve(self.sources.metrics.as_deref())
    }

    pub fn taxonomy_path(&self) -> Option<PathBuf> {
        self.resolve(self.sources.taxonomy.as_deref())
    }

    pub fn ssc_export_path(&self) -> Option<PathBuf> {
        self.resolve(self.sources.ssc_export.as_deref())
    }

    pub fn rules_source(&self) -> Option<&str> {
        self.rules.source.as_deref()
    }

    fn resolve(&self, path: Option<&Path>) -> Option<PathBuf> {
        let path = path?;
        Some(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }

    /// Generate a starter settings file.
    pub fn starter_toml() -> &'static str {
        r#"# fortify-bridge settings

[sources]
# Metric definitions (YAML). Built-in Fortify metrics are used when omitted.
# metrics = "metrics.yml"

# External category lists (JSON) used to generate rules.
# taxonomy = "externalmetadata.json"

# Saved SSC API responses, one directory per application version.
# ssc_export = "ssc-export"

[rules]
# External list to generate rules from, e.g. "CWE".
# "single" registers only the catch-all rule.
# source = "single"
"#
    }
}
