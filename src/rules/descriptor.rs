use std::fmt;

use serde::{Deserialize, Serialize};

use super::{OTHER_RULE_KEY, RULE_TAG};
use crate::expr::docs::html_escape;
use crate::taxonomy::ExternalCategory;

/// Host issue type of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Vulnerability,
    SecurityHotspot,
    Bug,
    CodeSmell,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vulnerability => write!(f, "VULNERABILITY"),
            Self::SecurityHotspot => write!(f, "SECURITY_HOTSPOT"),
            Self::Bug => write!(f, "BUG"),
            Self::CodeSmell => write!(f, "CODE_SMELL"),
        }
    }
}

/// Host severity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostSeverity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl fmt::Display for HostSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Minor => write!(f, "MINOR"),
            Self::Major => write!(f, "MAJOR"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Blocker => write!(f, "BLOCKER"),
        }
    }
}

/// A rule to register in the host's rule repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub key: String,
    pub name: String,
    /// Rule documentation (HTML).
    pub html_description: String,
    pub rule_type: RuleType,
    pub default_severity: HostSeverity,
    pub tags: Vec<String>,
    pub activated_by_default: bool,
}

impl RuleDescriptor {
    /// A rule generated from an external taxonomy category.
    pub fn from_category(category: &ExternalCategory) -> Self {
        let description = if category.description.trim().is_empty() {
            &category.name
        } else {
            &category.description
        };
        Self {
            key: category.id.clone(),
            name: category.name.clone(),
            html_description: format!("<p>{}</p>", html_escape(description)),
            rule_type: RuleType::Vulnerability,
            default_severity: HostSeverity::Major,
            tags: vec![RULE_TAG.to_string()],
            activated_by_default: true,
        }
    }

    /// The fixed rule for findings that map to no taxonomy category.
    pub fn catch_all() -> Self {
        Self {
            key: OTHER_RULE_KEY.to_string(),
            name: "Fortify: other vulnerabilities".to_string(),
            html_description: "<p>Reports Fortify vulnerabilities that are not mapped to a \
                               category of the selected external list.</p>"
                .to_string(),
            rule_type: RuleType::Vulnerability,
            default_severity: HostSeverity::Major,
            tags: vec![RULE_TAG.to_string()],
            activated_by_default: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_rule_uses_description_or_name() {
        let rule = RuleDescriptor::from_category(&ExternalCategory {
            id: "CWE-79".into(),
            name: "Cross-site Scripting".into(),
            description: "Improper neutralization of <script>".into(),
        });
        assert_eq!(rule.key, "CWE-79");
        assert_eq!(rule.rule_type, RuleType::Vulnerability);
        assert_eq!(rule.tags, vec!["fortify".to_string()]);
        assert!(rule.activated_by_default);
        assert_eq!(
            rule.html_description,
            "<p>Improper neutralization of &lt;script&gt;</p>"
        );

        let bare = RuleDescriptor::from_category(&ExternalCategory {
            id: "A01".into(),
            name: "Broken Access Control".into(),
            description: String::new(),
        });
        assert_eq!(bare.html_description, "<p>Broken Access Control</p>");
    }

    #[test]
    fn catch_all_rule() {
        let rule = RuleDescriptor::catch_all();
        assert_eq!(rule.key, OTHER_RULE_KEY);
        assert!(rule.activated_by_default);
        assert!(rule.html_description.contains("not mapped"));
    }
}
