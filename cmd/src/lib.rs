use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use time::OffsetDateTime;

use cleaner::{JobDescriptor, TimeRange};

/// Job file layout
///
/// ```yaml
/// cleaner:
///   prometheus:
///     host: "localhost:9090"
///   from: 2023-01-01T00:00:00Z
///   to: 2023-02-01T00:00:00Z
///   metrics: [up]
///   labels: {job: node}
///   timeout: 5
/// ```
#[derive(Debug, Deserialize)]
struct JobFile {
    cleaner: CleanerSection,
}

#[derive(Debug, Deserialize)]
struct CleanerSection {
    prometheus: PrometheusSection,
    #[serde(default, with = "time::serde::rfc3339::option")]
    from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    to: Option<OffsetDateTime>,
    #[serde(default)]
    metrics: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
    /// Seconds
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct PrometheusSection {
    host: String,
    // NOTE: TLS towards the store is not supported
    #[serde(default)]
    tls: Option<serde_yaml::Value>,
}

/// Reads the job description from a YAML file.
pub fn load_job(path: impl AsRef<Path>) -> Result<JobDescriptor> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to open job file {}", path.display()))?;
    parse_job(&data).wrap_err_with(|| format!("bad job file {}", path.display()))
}

pub fn parse_job(data: &str) -> Result<JobDescriptor> {
    let job: JobFile =
        serde_yaml::from_str(data).map_err(|e| eyre!("failed to unmarshal job file: {e}"))?;
    let section = job.cleaner;

    if section.prometheus.tls.as_ref().is_some_and(|v| !v.is_null()) {
        tracing::warn!("TLS settings are not supported, ignoring");
    }
    let time_range = TimeRange::from_bounds(section.from, section.to);
    if time_range.is_none() && (section.from.is_some() || section.to.is_some()) {
        tracing::warn!(
            from = ?section.from,
            to = ?section.to,
            "both `from` and `to` are required for a time range, deleting without one"
        );
    }

    Ok(JobDescriptor::new(section.prometheus.host, section.timeout)?
        .with_metric_names(section.metrics.unwrap_or_default())
        .with_label_selector(section.labels.unwrap_or_default())
        .with_time_range(time_range))
}
