use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Resolution produced no match expressions, so there is nothing to
    /// delete.
    #[error("invalid queries")]
    InvalidQueries,

    #[error("invalid job: {0}")]
    InvalidJob(String),

    /// The per-request deadline elapsed before a response was received.
    #[error("request to {url} timed out after {}s", timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Delete and sweep calls succeed only with `204 No Content`.
    #[error("failed to delete, status code: {}", status.as_u16())]
    UnexpectedStatus { url: String, status: StatusCode },
}
