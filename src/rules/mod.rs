//! Rule repository generation.
//!
//! Rules come from the categories of the selected external list plus a fixed
//! catch-all rule. The catch-all key is always present, so every remote
//! finding has a rule to be reported under.

mod catalog;
mod descriptor;
pub mod issue;
mod profile;

pub use catalog::{build_catalog, build_catalog_for, RuleCatalog};
pub use descriptor::{HostSeverity, RuleDescriptor, RuleType};
pub use issue::{Friority, HostIssue, IssueMapper, Vulnerability};
pub use profile::{ActiveRule, QualityProfile, DEFAULT_PROFILE_NAME};

/// Rule repository key on the host.
pub const REPOSITORY_KEY: &str = "fortify";

/// Rule repository display name.
pub const REPOSITORY_NAME: &str = "Fortify";

/// Key of the catch-all rule.
pub const OTHER_RULE_KEY: &str = "other";

/// Rules-source value meaning "no external list, catch-all rule only".
pub const SINGLE_RULE_SOURCE: &str = "single";

/// Tag attached to every generated rule.
pub const RULE_TAG: &str = "fortify";
