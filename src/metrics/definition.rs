use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::{Expression, Value};

/// Value type of a metric, named as the host platform names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Int,
    Float,
    Percent,
    Bool,
    String,
    Millisec,
    WorkDur,
    Rating,
    Level,
    Distrib,
    Data,
}

impl ValueType {
    pub const ALL: [Self; 11] = [
        Self::Int,
        Self::Float,
        Self::Percent,
        Self::Bool,
        Self::String,
        Self::Millisec,
        Self::WorkDur,
        Self::Rating,
        Self::Level,
        Self::Distrib,
        Self::Data,
    ];

    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "INT" | "INTEGER" => Some(Self::Int),
            "FLOAT" | "DOUBLE" => Some(Self::Float),
            "PERCENT" => Some(Self::Percent),
            "BOOL" | "BOOLEAN" => Some(Self::Bool),
            "STRING" | "TEXT" => Some(Self::String),
            "MILLISEC" | "DURATION" => Some(Self::Millisec),
            "WORK_DUR" => Some(Self::WorkDur),
            "RATING" => Some(Self::Rating),
            "LEVEL" => Some(Self::Level),
            "DISTRIB" | "DISTRIBUTION" => Some(Self::Distrib),
            "DATA" => Some(Self::Data),
            _ => None,
        }
    }

    pub fn host_name(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Percent => "PERCENT",
            Self::Bool => "BOOL",
            Self::String => "STRING",
            Self::Millisec => "MILLISEC",
            Self::WorkDur => "WORK_DUR",
            Self::Rating => "RATING",
            Self::Level => "LEVEL",
            Self::Distrib => "DISTRIB",
            Self::Data => "DATA",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

/// Which way a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Higher values are better.
    Better,
    /// Lower values are better.
    Worse,
    None,
}

impl Direction {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "better" | "better-higher" | "higher" | "1" => Some(Self::Better),
            "worse" | "better-lower" | "lower" | "-1" => Some(Self::Worse),
            "none" | "neutral" | "0" => Some(Self::None),
            _ => None,
        }
    }

    /// The host's integer encoding.
    pub fn host_value(self) -> i32 {
        match self {
            Self::Better => 1,
            Self::Worse => -1,
            Self::None => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Better => write!(f, "better"),
            Self::Worse => write!(f, "worse"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Where a metric's value comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    Literal(Value),
    Expression(Expression),
}

/// A declared, typed measurement registered with the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDefinition {
    /// Unique, stable key (e.g., "fortify.ssc.security.rating").
    pub key: String,
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
    pub direction: Direction,
    pub qualitative: bool,
    /// Grouping label shown by the host.
    pub domain: String,
    pub source: MetricSource,
}

impl MetricDefinition {
    pub fn expression(&self) -> Option<&Expression> {
        match &self.source {
            MetricSource::Expression(expr) => Some(expr),
            MetricSource::Literal(_) => None,
        }
    }
}
