use std::fmt;

use serde::{Deserialize, Serialize};

use super::{HostSeverity, RuleCatalog, REPOSITORY_KEY};

/// Fortify priority ("friority") of a vulnerability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Friority {
    Low,
    Medium,
    High,
    Critical,
}

impl Friority {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" | "crit" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" | "med" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn host_severity(self) -> HostSeverity {
        match self {
            Self::Critical => HostSeverity::Blocker,
            Self::High => HostSeverity::Critical,
            Self::Medium => HostSeverity::Major,
            Self::Low => HostSeverity::Minor,
        }
    }
}

impl fmt::Display for Friority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// A vulnerability as returned by the scan-management service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub issue_instance_id: String,
    /// Fortify category, e.g. "SQL Injection".
    pub issue_name: String,
    pub friority: String,
    #[serde(default)]
    pub full_file_name: Option<String>,
    #[serde(default)]
    pub line_number: Option<u32>,
    /// Ids of the categories this issue maps to in the selected external list.
    #[serde(default)]
    pub external_category_ids: Vec<String>,
}

/// An issue ready to be reported on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostIssue {
    pub repository_key: String,
    pub rule_key: String,
    pub severity: HostSeverity,
    pub message: String,
    pub file_path: Option<String>,
    pub line: Option<u32>,
    /// Fortify issue instance id, kept for traceability.
    pub external_id: String,
}

/// Maps remote vulnerabilities onto the rules of a catalog.
#[derive(Debug, Clone, Copy)]
pub struct IssueMapper<'a> {
    catalog: &'a RuleCatalog,
}

impl<'a> IssueMapper<'a> {
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self { catalog }
    }

    pub fn map(&self, vuln: &Vulnerability) -> HostIssue {
        let severity = Friority::from_str_lenient(&vuln.friority)
            .map(Friority::host_severity)
            .unwrap_or_else(|| {
                tracing::debug!(
                    issue = %vuln.issue_instance_id,
                    friority = %vuln.friority,
                    "unknown friority, using MAJOR"
                );
                HostSeverity::Major
            });

        HostIssue {
            repository_key: REPOSITORY_KEY.to_string(),
            rule_key: self
                .catalog
                .rule_key_for(&vuln.external_category_ids)
                .to_string(),
            severity,
            message: vuln.issue_name.clone(),
            file_path: vuln.full_file_name.clone(),
            line: vuln.line_number,
            external_id: vuln.issue_instance_id.clone(),
        }
    }

    pub fn map_all(&self, vulns: &[Vulnerability]) -> Vec<HostIssue> {
        vulns.iter().map(|v| self.map(v)).collect()
    }
}
