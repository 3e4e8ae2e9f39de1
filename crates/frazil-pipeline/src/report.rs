//! Final run report across all requested pipelines.

use chrono::NaiveDate;
use frazil_types::EventType;

/// One pipeline's failure, kept for the operator-facing summary.
#[derive(Debug)]
pub struct PipelineFailure {
    /// Date of the failed pipeline.
    pub date: NaiveDate,
    /// Feed type of the failed pipeline.
    pub event_type: EventType,
    /// Rendered error.
    pub error: String,
}

/// Aggregated outcome of a coordinator run.
///
/// Failures are local to their pipeline; the report exists so an operator
/// can see at a glance which (date, type) pairs need a retry.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Pipelines that wrote all their archives.
    pub archived: usize,
    /// Pipelines skipped because their tick archive already existed.
    pub skipped: usize,
    /// Pipelines stopped by cancellation.
    pub cancelled: usize,
    /// Pipelines that failed, with context.
    pub failures: Vec<PipelineFailure>,
}

impl RunReport {
    /// Returns true if no pipeline failed or was cancelled.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.cancelled == 0
    }

    /// Returns the total number of pipelines accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.archived + self.skipped + self.cancelled + self.failures.len()
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} archived, {} skipped, {} failed, {} cancelled",
            self.archived,
            self.skipped,
            self.failures.len(),
            self.cancelled
        )
    }
}
