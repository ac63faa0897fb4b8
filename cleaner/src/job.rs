use std::{collections::BTreeMap, time::Duration};

use time::OffsetDateTime;

use crate::{Error, Result};

/// Absolute time bounds of the series to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: OffsetDateTime,
    pub to: OffsetDateTime,
}

impl TimeRange {
    /// Builds a range only if both bounds are given; a half-open range is
    /// not supported.
    pub fn from_bounds(from: Option<OffsetDateTime>, to: Option<OffsetDateTime>) -> Option<Self> {
        Some(Self {
            from: from?,
            to: to?,
        })
    }

    /// Returns `(start, end)` in Unix seconds if both are strictly positive.
    pub fn unix_bounds(&self) -> Option<(i64, i64)> {
        let start = self.from.unix_timestamp();
        let end = self.to.unix_timestamp();
        (start > 0 && end > 0).then_some((start, end))
    }
}

/// What to delete, and from where. Read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    /// `host:port` of the store, without scheme.
    pub store_address: String,
    pub time_range: Option<TimeRange>,
    /// Explicit metric names. When non-empty, `label_selector` is not used
    /// for resolution.
    pub metric_names: Vec<String>,
    /// Label name to exact value, iterated in label name order.
    pub label_selector: BTreeMap<String, String>,
    /// Deadline applied to every single outbound request.
    pub request_timeout: Duration,
}

impl JobDescriptor {
    pub fn new(store_address: impl Into<String>, request_timeout_secs: u64) -> Result<Self> {
        let store_address = store_address.into();
        if store_address.trim().is_empty() {
            return Err(Error::InvalidJob("store address is empty".to_string()));
        }
        if store_address.contains("://") {
            return Err(Error::InvalidJob(format!(
                "store address {store_address:?} must not contain a scheme"
            )));
        }
        if request_timeout_secs == 0 {
            return Err(Error::InvalidJob(
                "request timeout must be a positive number of seconds".to_string(),
            ));
        }
        Ok(Self {
            store_address,
            time_range: None,
            metric_names: Vec::new(),
            label_selector: BTreeMap::new(),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    pub fn with_metric_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metric_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_label_selector<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.label_selector = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_time_range(mut self, time_range: Option<TimeRange>) -> Self {
        self.time_range = time_range;
        self
    }
}
