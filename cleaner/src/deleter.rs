use crate::{client::StoreClient, query::Queries, Result};

/// Maximum number of match expressions sent in one delete request.
pub const SIZE: usize = 10;

/// Where the deletion loop stands relative to the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// More than `SIZE` expressions left: delete a full batch, then sweep.
    HasRemainder,
    /// At most `SIZE` expressions left: delete them, no trailing sweep.
    Final,
}

impl State {
    fn of(remaining: usize) -> Self {
        if remaining > SIZE {
            State::HasRemainder
        } else {
            State::Final
        }
    }
}

/// What a completed run did against the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeletionReport {
    pub batches: usize,
    pub expressions: usize,
    pub sweeps: usize,
}

/// Deletes match expressions in batches of [`SIZE`], sweeping tombstones
/// between batches.
///
/// The first failed delete or sweep aborts the run. Batches completed before
/// it stay deleted.
pub struct BatchDeleter<'a> {
    client: &'a StoreClient,
}

impl<'a> BatchDeleter<'a> {
    pub fn new(client: &'a StoreClient) -> Self {
        Self { client }
    }

    pub async fn run(&self, queries: &Queries) -> Result<DeletionReport> {
        let mut report = DeletionReport::default();
        let mut remaining = queries.expressions();
        loop {
            match State::of(remaining.len()) {
                State::HasRemainder => {
                    let (batch, rest) = remaining.split_at(SIZE);
                    self.delete(queries, batch, &mut report).await?;
                    self.client.clean_tombstones().await?;
                    report.sweeps += 1;
                    remaining = rest;
                }
                State::Final => {
                    self.delete(queries, remaining, &mut report).await?;
                    return Ok(report);
                }
            }
        }
    }

    async fn delete(
        &self,
        queries: &Queries,
        batch: &[String],
        report: &mut DeletionReport,
    ) -> Result<()> {
        tracing::info!(
            batch = report.batches + 1,
            size = batch.len(),
            "deleting series"
        );
        self.client.delete_series(&queries.delete_query(batch)).await?;
        report.batches += 1;
        report.expressions += batch.len();
        Ok(())
    }
}
