pub mod console;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::MetricsPass;
use crate::registration::RegistrationRequest;
use crate::rules::HostIssue;
use crate::taxonomy::ExternalList;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" | "table" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render the rule repository and profile.
pub fn render_rules(request: &RegistrationRequest, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_rules(request)),
        OutputFormat::Json => json::render(&request.repository),
    }
}

/// Render the metric definitions.
pub fn render_metrics(request: &RegistrationRequest, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_metrics(request)),
        OutputFormat::Json => json::render(&request.metrics),
    }
}

/// Render the results of a metrics pass.
pub fn render_pass(pass: &MetricsPass, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_pass(pass)),
        OutputFormat::Json => json::render(pass),
    }
}

/// Render mapped host issues.
pub fn render_issues(issues: &[HostIssue], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_issues(issues)),
        OutputFormat::Json => json::render(&issues),
    }
}

/// Render the available external lists.
pub fn render_taxonomies(lists: &[&ExternalList], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_taxonomies(lists)),
        OutputFormat::Json => json::render(lists),
    }
}
