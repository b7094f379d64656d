use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::{MetricDefinition, MetricSource, ValueType};
use crate::expr::{self, coerce, EvaluationContext, ExpressionError, MeasureValue};

/// A computed metric value for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    pub metric_key: String,
    pub value_type: ValueType,
    pub value: MeasureValue,
}

/// A metric that could not be computed in this pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFailure {
    pub metric_key: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ExpressionError,
}

/// Result of evaluating every metric definition against one context.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsPass {
    pub evaluated_at: DateTime<Utc>,
    pub measures: Vec<Measure>,
    pub failures: Vec<MetricFailure>,
}

impl MetricsPass {
    pub fn measure(&self, key: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.metric_key == key)
    }

    pub fn failure(&self, key: &str) -> Option<&MetricFailure> {
        self.failures.iter().find(|f| f.metric_key == key)
    }
}

/// Compute one metric's value.
pub fn evaluate_metric(
    metric: &MetricDefinition,
    context: &EvaluationContext,
) -> Result<MeasureValue, ExpressionError> {
    match &metric.source {
        MetricSource::Expression(expression) => {
            expr::evaluate(expression, context, metric.value_type)
        }
        MetricSource::Literal(value) => coerce(value, metric.value_type),
    }
}

/// Evaluate all metrics. A failing metric is logged and recorded as a
/// failure; it never prevents the remaining metrics from being computed.
pub fn evaluate_all(metrics: &[MetricDefinition], context: &EvaluationContext) -> MetricsPass {
    let mut measures = Vec::with_capacity(metrics.len());
    let mut failures = Vec::new();

    for metric in metrics {
        match evaluate_metric(metric, context) {
            Ok(value) => measures.push(Measure {
                metric_key: metric.key.clone(),
                value_type: metric.value_type,
                value,
            }),
            Err(error) => {
                tracing::warn!(
                    metric = %metric.key,
                    error = %error,
                    "metric not computed for this analysis"
                );
                failures.push(MetricFailure {
                    metric_key: metric.key.clone(),
                    error,
                });
            }
        }
    }

    MetricsPass {
        evaluated_at: Utc::now(),
        measures,
        failures,
    }
}

fn serialize_display<S>(error: &ExpressionError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(error)
}
