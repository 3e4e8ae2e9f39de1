//! Concurrent execution of pipelines across a date range.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use frazil_fetch::DownloadClient;
use frazil_types::{DateRange, EventType, FrazilError};

use crate::{Outcome, PipelineConfig, PipelineFailure, RunReport, run_pipeline};

/// Runs one pipeline per (date, feed type) pair, concurrently.
///
/// Pipelines share only the HTTP client's connection pool and the read-only
/// configuration; no two ever target the same archive path, so the output
/// tree needs no locking beyond the existence check each pipeline performs
/// before starting.
#[derive(Debug)]
pub struct Coordinator {
    client: DownloadClient,
    config: Arc<PipelineConfig>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator.
    ///
    /// `concurrency` bounds the number of pipelines in flight at once.
    /// `cancel` is observed by every pipeline at its suspension points;
    /// cancelling it makes in-flight pipelines clean up and stop.
    #[must_use]
    pub fn new(
        client: DownloadClient,
        config: PipelineConfig,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            config: Arc::new(config),
            concurrency: concurrency.max(1),
            cancel,
        }
    }

    /// Returns the cancellation token observed by the pipelines.
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs every (date, type) pipeline in the range and reports outcomes.
    ///
    /// A pipeline's failure never aborts its siblings; it is recorded in
    /// the report and logged as it happens.
    pub async fn run(&self, range: DateRange) -> RunReport {
        let pairs: Vec<(NaiveDate, EventType)> = range
            .days()
            .flat_map(|date| EventType::all().iter().map(move |t| (date, *t)))
            .collect();

        let mut results = stream::iter(pairs)
            .map(|(date, event_type)| {
                let client = self.client.clone();
                let config = Arc::clone(&self.config);
                let cancel = self.cancel.clone();
                async move {
                    let result = run_pipeline(&client, &config, date, event_type, &cancel).await;
                    (date, event_type, result)
                }
            })
            .buffer_unordered(self.concurrency);

        let mut report = RunReport::default();
        while let Some((date, event_type, result)) = results.next().await {
            match result {
                Ok(Outcome::Archived) => {
                    info!(%date, %event_type, "archived");
                    report.archived += 1;
                }
                Ok(Outcome::Skipped) => {
                    info!(%date, %event_type, "skipped, archive already present");
                    report.skipped += 1;
                }
                Err(FrazilError::Cancelled) => {
                    info!(%date, %event_type, "cancelled");
                    report.cancelled += 1;
                }
                Err(e) => {
                    error!(%date, %event_type, error = %e, "pipeline failed");
                    report.failures.push(PipelineFailure {
                        date,
                        event_type,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}
