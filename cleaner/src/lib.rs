//! Deletes series from a store exposing the Prometheus admin HTTP API.
//!
//! A run resolves the metric names to delete, renders them into match
//! expressions and deletes them in batches of [`deleter::SIZE`], compacting
//! tombstones between batches.

pub mod client;
pub mod deleter;
mod error;
pub mod job;
pub mod query;
pub mod resolver;

pub use {
    client::StoreClient,
    deleter::{BatchDeleter, DeletionReport},
    error::{Error, Result},
    job::{JobDescriptor, TimeRange},
    query::Queries,
};

/// One deletion job against one store.
pub struct Cleaner {
    job: JobDescriptor,
    client: StoreClient,
}

impl Cleaner {
    pub fn new(job: JobDescriptor) -> Self {
        let client = StoreClient::for_job(&job);
        Self { job, client }
    }

    pub fn job(&self) -> &JobDescriptor {
        &self.job
    }

    #[tracing::instrument(skip_all, fields(store = %self.job.store_address))]
    pub async fn run(&self) -> Result<DeletionReport> {
        let metrics = resolver::resolve(&self.job, &self.client).await;
        tracing::info!(count = metrics.len(), "resolved metric names");

        let queries = Queries::build(&metrics, &self.job)?;
        let report = BatchDeleter::new(&self.client).run(&queries).await?;
        tracing::info!(
            batches = report.batches,
            expressions = report.expressions,
            sweeps = report.sweeps,
            "deleted series"
        );
        Ok(report)
    }
}
