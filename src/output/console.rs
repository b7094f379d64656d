use crate::metrics::MetricsPass;
use crate::registration::RegistrationRequest;
use crate::rules::HostIssue;
use crate::taxonomy::ExternalList;

/// Rule repository as a table, followed by the profile summary.
pub fn render_rules(request: &RegistrationRequest) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n  Repository {} ({}), rules from: {}\n\n",
        request.repository.name,
        request.repository.key,
        request.rules_source.as_deref().unwrap_or("catch-all only"),
    ));
    output.push_str(&format!(
        "  {:<16} {:<40} {:<14} {:<9} ACTIVE\n",
        "KEY", "NAME", "TYPE", "SEVERITY"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(88)));
    for rule in &request.repository.rules {
        output.push_str(&format!(
            "  {:<16} {:<40} {:<14} {:<9} {}\n",
            rule.key,
            truncate(&rule.name, 40),
            rule.rule_type.to_string(),
            rule.default_severity.to_string(),
            if rule.activated_by_default { "yes" } else { "no" },
        ));
    }
    output.push_str(&format!(
        "\n  Profile '{}' activates {} rule(s)\n\n",
        request.profile.name,
        request.profile.active_rules.len()
    ));

    output
}

/// Metric definitions as a table.
pub fn render_metrics(request: &RegistrationRequest) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n  {:<32} {:<30} {:<9} {:<5} DOMAIN\n",
        "KEY", "NAME", "TYPE", "DIR"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(88)));
    for metric in &request.metrics {
        output.push_str(&format!(
            "  {:<32} {:<30} {:<9} {:<5} {}\n",
            metric.key,
            truncate(&metric.name, 30),
            metric.value_type.to_string(),
            metric.direction,
            metric.domain,
        ));
    }
    output.push('\n');

    output
}

/// Measures of a pass, then the metrics that could not be computed.
pub fn render_pass(pass: &MetricsPass) -> String {
    let mut output = String::new();

    if pass.measures.is_empty() && pass.failures.is_empty() {
        output.push_str("\n  No metrics defined.\n\n");
        return output;
    }

    output.push_str(&format!(
        "\n  {} measure(s) computed at {}:\n\n",
        pass.measures.len(),
        pass.evaluated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for measure in &pass.measures {
        output.push_str(&format!(
            "  {:<32} {:<9} {}\n",
            measure.metric_key,
            measure.value_type.to_string(),
            measure.value
        ));
    }

    if !pass.failures.is_empty() {
        output.push_str(&format!("\n  {} metric(s) not computed:\n\n", pass.failures.len()));
        for failure in &pass.failures {
            output.push_str(&format!("  {:<32} {}\n", failure.metric_key, failure.error));
        }
    }
    output.push('\n');

    output
}

/// Host issues, one per line.
pub fn render_issues(issues: &[HostIssue]) -> String {
    let mut output = String::new();

    if issues.is_empty() {
        output.push_str("\n  No issues to report.\n\n");
        return output;
    }

    output.push_str(&format!("\n  {} issue(s):\n\n", issues.len()));
    for issue in issues {
        let location = match (&issue.file_path, issue.line) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file.clone(),
            _ => "-".into(),
        };
        output.push_str(&format!(
            "  [{:<8}] {:<16} {}\n           at {}\n",
            issue.severity.to_string(),
            issue.rule_key,
            issue.message,
            location
        ));
    }
    output.push('\n');

    output
}

/// External lists with their category counts.
pub fn render_taxonomies(lists: &[&ExternalList]) -> String {
    let mut output = String::new();

    if lists.is_empty() {
        output.push_str("\n  No external lists available.\n\n");
        return output;
    }

    output.push_str(&format!("\n  {:<32} {:>10}  DESCRIPTION\n", "NAME", "CATEGORIES"));
    output.push_str(&format!("  {}\n", "-".repeat(80)));
    for list in lists {
        output.push_str(&format!(
            "  {:<32} {:>10}  {}\n",
            truncate(list.name(), 32),
            list.len(),
            list.description().unwrap_or("-"),
        ));
    }
    output.push('\n');

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
