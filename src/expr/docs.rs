//! HTML documentation for the metric expression language, shown to users as a
//! rule/metric description next to the fields they can reference.

use serde::{Deserialize, Serialize};

/// A field that expressions may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    pub description: String,
}

impl FieldDoc {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A worked example: expression text and what it computes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionExample {
    pub expression: String,
    pub description: String,
}

impl ExpressionExample {
    pub fn new(expression: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            description: description.into(),
        }
    }
}

const HEADER: &str = "Metric values are computed with bridge expressions, a small arithmetic \
    language. Fields are read with <code>group['name']</code> and may be combined with \
    <code>+</code>, <code>-</code>, <code>*</code>, <code>/</code>, parentheses, numbers and \
    quoted strings.";

/// Render the documentation fragment. Examples are omitted when empty.
pub fn render(fields: &[FieldDoc], examples: &[ExpressionExample]) -> String {
    let mut html = String::from("<div class=\"expression-docs\">");
    html.push_str(&format!("<p>{HEADER}</p>"));

    html.push_str("<p>Available fields:</p>");
    html.push_str(&list(
        fields.iter().map(|f| (f.name.as_str(), f.description.as_str())),
    ));

    if !examples.is_empty() {
        html.push_str("<p>Examples:</p>");
        html.push_str(&list(
            examples
                .iter()
                .map(|e| (e.expression.as_str(), e.description.as_str())),
        ));
    }

    html.push_str("</div>");
    html
}

fn list<'a>(items: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let entries: String = items
        .map(|(name, description)| {
            format!(
                "<li>{} - {}</li>",
                html_escape(name),
                html_escape(description)
            )
        })
        .collect();
    format!("<ul>{entries}</ul>")
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
