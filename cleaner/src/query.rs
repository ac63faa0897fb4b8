use std::collections::BTreeMap;

use crate::{job::TimeRange, Error, JobDescriptor, Result};

const MATCH_PARAM: &str = "match[]=";

/// Match expressions to delete plus the time-range suffix shared by every
/// delete request. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queries {
    expressions: Vec<String>,
    suffix: String,
}

impl Queries {
    /// Renders `match[]=<metric><labels>` for every metric name.
    ///
    /// Fails with [`Error::InvalidQueries`] if `metrics` is empty.
    pub fn build(metrics: &[String], job: &JobDescriptor) -> Result<Self> {
        if metrics.is_empty() {
            return Err(Error::InvalidQueries);
        }
        let fragment = label_fragment(&job.label_selector);
        Ok(Self {
            expressions: metrics
                .iter()
                .map(|metric| format!("{MATCH_PARAM}{metric}{fragment}"))
                .collect(),
            suffix: time_range_suffix(job.time_range.as_ref()),
        })
    }

    pub fn expressions(&self) -> &[String] {
        &self.expressions
    }

    /// `&start=..&end=..` or the empty string.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Joins a batch of expressions into a delete query string.
    ///
    /// Selectors are percent-encoded so that `+`, `&` and `=` inside label
    /// values reach the store unchanged.
    pub(crate) fn delete_query(&self, batch: &[String]) -> String {
        let mut query = batch
            .iter()
            .map(|expression| encode_expression(expression))
            .collect::<Vec<_>>()
            .join("&");
        query.push_str(&self.suffix);
        query
    }
}

fn encode_expression(expression: &str) -> String {
    match expression.strip_prefix(MATCH_PARAM) {
        Some(selector) => format!("{MATCH_PARAM}{}", urlencoding::encode(selector)),
        None => urlencoding::encode(expression).into_owned(),
    }
}

/// Renders `{k1="v1",k2="v2"}`, or the empty string for no labels.
///
/// Values are quoted verbatim; embedded quotes are not escaped.
pub fn label_fragment(labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let clauses = labels
        .iter()
        .map(|(name, value)| format!("{name}=\"{value}\""))
        .collect::<Vec<_>>();
    format!("{{{}}}", clauses.join(","))
}

pub fn time_range_suffix(range: Option<&TimeRange>) -> String {
    match range.and_then(TimeRange::unix_bounds) {
        Some((start, end)) => format!("&start={start}&end={end}"),
        None => String::new(),
    }
}
