pub mod ssc_export;

use crate::error::Result;
use crate::expr::docs::{ExpressionExample, FieldDoc};
use crate::expr::{EvaluationContext, FieldGroup};

pub use ssc_export::SscExportSource;

/// A data source supplies the per-analysis values metric expressions read.
///
/// The source owns transport, authentication and retries; the engine only
/// sees the resulting [`EvaluationContext`].
pub trait DataSource: Send + Sync {
    /// Human-readable name of the source.
    fn name(&self) -> &str;

    /// Fields that expressions may reference.
    fn fields(&self) -> Vec<FieldDoc>;

    /// Worked expression examples for the documentation.
    fn examples(&self) -> Vec<ExpressionExample> {
        Vec::new()
    }

    /// Fetch a fresh context for an application version.
    fn fetch(&self, version: &str) -> Result<EvaluationContext>;
}

/// The field groups every SSC-backed source exposes.
pub fn ssc_fields() -> Vec<FieldDoc> {
    FieldGroup::ALL
        .into_iter()
        .map(|g| FieldDoc::new(g.binding(), g.description()))
        .collect()
}

pub fn ssc_examples() -> Vec<ExpressionExample> {
    vec![
        ExpressionExample::new(
            "pi['Fortify Security Rating']",
            "Fortify security rating of the application version",
        ),
        ExpressionExample::new(
            "var['CFPO']+var['HFPO']",
            "Number of critical and high priority issues",
        ),
    ]
}
