//! Metric expression language.
//!
//! A deliberately small, side-effect-free language: literals, field access
//! on named context groups (`var['CFPO']`, `pi['Fortify Security Rating']`)
//! and `+ - * /` with parentheses. Expressions are parsed once when the
//! metric definitions load and evaluated by walking the tree against an
//! [`EvaluationContext`].

mod coerce;
mod context;
pub mod docs;
mod parser;
mod value;

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::metrics::ValueType;

pub use coerce::{coerce, Level, MeasureValue};
pub use context::{EvaluationContext, FieldGroup};
pub use value::Value;

use parser::Node;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Could not parse expression '{expression}' at offset {offset}: {message}")]
    Parse {
        expression: String,
        offset: usize,
        message: String,
    },

    #[error("Unbound field {group}['{field}']")]
    UnboundField { group: String, field: String },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Cannot coerce {value} to {target}")]
    ValueCoercion { value: String, target: ValueType },
}

/// A parsed metric expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let root = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// The expression text as written in the metric definition.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate to a raw value, before coercion to a metric type.
    pub fn evaluate(&self, context: &EvaluationContext) -> Result<Value, ExpressionError> {
        self.root.evaluate(context)
    }

    /// `(group, field)` pairs referenced by this expression, in source order.
    pub fn references(&self) -> Vec<(&str, &str)> {
        let mut refs = Vec::new();
        self.root.collect_references(&mut refs);
        refs
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Expression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let source = String::deserialize(deserializer)?;
        Self::parse(&source).map_err(D::Error::custom)
    }
}

/// Evaluate `expression` against `context` and coerce the result to `target`.
pub fn evaluate(
    expression: &Expression,
    context: &EvaluationContext,
    target: ValueType,
) -> Result<MeasureValue, ExpressionError> {
    let raw = expression.evaluate(context)?;
    coerce(&raw, target)
}
