//! Declarative metric definitions and the per-analysis metrics pass.
//!
//! Definitions come from a YAML document (or the embedded defaults) and are
//! validated as a whole on load: value types, directions, key syntax,
//! expression syntax and key uniqueness.

mod definition;
mod model;
pub mod pass;

pub use definition::{Direction, MetricDefinition, MetricSource, ValueType};
pub use model::MetricsConfig;
pub use pass::{evaluate_all, Measure, MetricFailure, MetricsPass};
