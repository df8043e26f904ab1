//! Bounded-concurrency runner for many documents.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::orchestrator::{Document, Pipeline};
use crate::state::RunReport;

/// Runs independent pipeline instances over a shared [`Pipeline`].
#[derive(Clone)]
pub struct BatchRunner {
    pipeline: Arc<Pipeline>,
    concurrency: usize,
}

impl BatchRunner {
    /// `concurrency` is clamped to at least one.
    pub fn new(pipeline: Arc<Pipeline>, concurrency: usize) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process every document; reports come back in input order.
    pub async fn run(&self, documents: Vec<Document>) -> Vec<RunReport> {
        let total = documents.len();
        let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        info!(documents = total, concurrency = self.concurrency, "batch started");

        for (index, document) in documents.into_iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                (index, pipeline.run(&document).await)
            });
        }

        let mut reports: Vec<Option<RunReport>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => reports[index] = Some(report),
                Err(e) => error!(error = %e, "pipeline task aborted"),
            }
        }

        let reports: Vec<RunReport> = reports
            .into_iter()
            .zip(ids)
            .map(|(report, id)| {
                report.unwrap_or_else(|| RunReport::aborted(id, "pipeline task aborted"))
            })
            .collect();

        let failed = reports.iter().filter(|r| r.is_failed()).count();
        info!(documents = total, failed, "batch finished");
        reports
    }
}
