use std::{future::Future, time::Duration};

use reqwest::StatusCode;
use serde::Deserialize;

use crate::{Error, JobDescriptor, Result};

pub const ALL_METRICS_PATH: &str = "/api/v1/label/__name__/values";
pub const DELETE_SERIES_PATH: &str = "/api/v1/admin/tsdb/delete_series";
pub const CLEAN_TOMBSTONES_PATH: &str = "/api/v1/admin/tsdb/clean_tombstones";

/// Path of the lookup for metric names carrying `label="value"`.
pub fn label_values_path(label: &str, value: &str) -> String {
    format!(
        "/api/v1/label/{}/{}/values",
        urlencoding::encode(label),
        urlencoding::encode(value)
    )
}

/// Label values response of the Prometheus HTTP API
///
/// See https://prometheus.io/docs/prometheus/latest/querying/api/#querying-label-values
#[derive(Debug, Deserialize)]
struct LabelValuesResponse {
    status: String,
    data: Vec<String>,
}

/// Issues single requests against the store's HTTP API, each bounded by the
/// job's request timeout.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    address: String,
    timeout: Duration,
}

impl StoreClient {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            address: address.into(),
            timeout,
        }
    }

    pub fn for_job(job: &JobDescriptor) -> Self {
        Self::new(job.store_address.clone(), job.request_timeout)
    }

    pub async fn all_metric_names(&self) -> Result<Vec<String>> {
        self.label_values(ALL_METRICS_PATH).await
    }

    pub async fn metric_names_by_label(&self, label: &str, value: &str) -> Result<Vec<String>> {
        self.label_values(&label_values_path(label, value)).await
    }

    pub async fn delete_series(&self, query: &str) -> Result<()> {
        self.post(DELETE_SERIES_PATH, query).await
    }

    /// Asks the store to compact away pending tombstones.
    pub async fn clean_tombstones(&self) -> Result<()> {
        self.post(CLEAN_TOMBSTONES_PATH, "").await
    }

    async fn label_values(&self, path: &str) -> Result<Vec<String>> {
        let url = self.url(path, "");
        tracing::info!(%url, "GET");
        let body = self
            .with_deadline(&url, async {
                let response = self.http.get(&url).send().await?;
                response.bytes().await
            })
            .await?;
        let response: LabelValuesResponse =
            serde_json::from_slice(&body).map_err(|source| Error::Decode {
                url: url.clone(),
                source,
            })?;
        tracing::debug!(
            %url,
            status = %response.status,
            count = response.data.len(),
            "label values"
        );
        Ok(response.data)
    }

    async fn post(&self, path: &str, query: &str) -> Result<()> {
        let url = self.url(path, query);
        tracing::info!(%url, "POST");
        let status = self
            .with_deadline(&url, async {
                let response = self.http.post(&url).send().await?;
                Ok::<_, reqwest::Error>(response.status())
            })
            .await?;
        if status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            tracing::error!(%url, %status, "unexpected response status");
            Err(Error::UnexpectedStatus { url, status })
        }
    }

    /// Awaits `request` until the deadline; an elapsed deadline drops the
    /// in-flight request.
    async fn with_deadline<T, F>(&self, url: &str, request: F) -> Result<T>
    where
        F: Future<Output = reqwest::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                tracing::error!(%url, error = %source, "request failed");
                Err(Error::Transport {
                    url: url.to_owned(),
                    source,
                })
            }
            Err(_) => {
                tracing::error!(%url, timeout = ?self.timeout, "request timed out");
                Err(Error::Timeout {
                    url: url.to_owned(),
                    timeout: self.timeout,
                })
            }
        }
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("http://{}{path}", self.address)
        } else {
            format!("http://{}{path}?{query}", self.address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, timeout: Duration) -> StoreClient {
        StoreClient::new(server.address().to_string(), timeout)
    }

    #[test]
    fn test_label_values_path() {
        assert_eq!(
            label_values_path("job", "node"),
            "/api/v1/label/job/node/values"
        );
        assert_eq!(
            label_values_path("instance", "10.0.0.1:9100/x"),
            "/api/v1/label/instance/10.0.0.1%3A9100%2Fx/values"
        );
    }

    #[test]
    fn test_url() {
        let client = StoreClient::new("localhost:9090", Duration::from_secs(5));
        assert_eq!(
            client.url(CLEAN_TOMBSTONES_PATH, ""),
            "http://localhost:9090/api/v1/admin/tsdb/clean_tombstones"
        );
        assert_eq!(
            client.url(DELETE_SERIES_PATH, "match[]=up"),
            "http://localhost:9090/api/v1/admin/tsdb/delete_series?match[]=up"
        );
    }

    #[tokio::test]
    async fn test_all_metric_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALL_METRICS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": ["up", "node_load1"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let names = client(&server, Duration::from_secs(5))
            .all_metric_names()
            .await
            .unwrap();
        assert_eq!(names, vec!["up", "node_load1"]);
    }

    #[tokio::test]
    async fn test_label_values_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/label/job/node/values"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_secs(5))
            .metric_names_by_label("job", "node")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_delete_series_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DELETE_SERIES_PATH))
            .and(query_param("match[]", "up"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, Duration::from_secs(5))
            .delete_series("match[]=up")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_post_rejects_other_success_codes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CLEAN_TOMBSTONES_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_secs(5))
            .clean_tombstones()
            .await
            .unwrap_err();
        match err {
            Error::UnexpectedStatus { status, .. } => assert_eq!(status, StatusCode::OK),
            err => panic!("unexpected error: {err:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DELETE_SERIES_PATH))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_millis(100))
            .delete_series("match[]=up")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_post_transport_error() {
        // nothing listens on the discard port
        let client = StoreClient::new("127.0.0.1:9", Duration::from_secs(5));
        let err = client.delete_series("match[]=up").await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }), "{err:?}");
    }
}
