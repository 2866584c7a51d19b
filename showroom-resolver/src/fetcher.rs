//! HTTP fetch layer.
//!
//! [`HttpTransport`] is the seam to the network; [`ReqwestTransport`] is the
//! production implementation. [`RetryingFetcher`] adds the per-source timeout
//! and constant-delay retry budget on top and decodes the body as JSON.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use showroom_core::{EndpointPolicy, FetchError};

/// Status and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single HTTP GET.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("showroom-resolver/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            after_ms: timeout.as_millis() as u64,
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, timeout, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify(url, timeout, e))?;
        Ok(RawResponse { status, body })
    }
}

/// GET + JSON decode with a timeout and a bounded, constant-delay retry.
#[derive(Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn HttpTransport>,
}

impl RetryingFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Fetch `url` under `policy`.
    ///
    /// Timeouts and network failures are retried up to `policy.max_retries`
    /// more times with `policy.retry_delay_ms` between attempts. Non-2xx
    /// responses and malformed JSON fail immediately.
    pub async fn fetch(&self, url: &str, policy: &EndpointPolicy) -> Result<Value, FetchError> {
        let attempts = policy.attempts();
        let mut attempt = 1;
        loop {
            match self.fetch_once(url, policy.timeout()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::debug!(
                        url = %url,
                        error = %e,
                        attempt = attempt,
                        max_attempts = attempts,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(policy.retry_delay()).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str, timeout: Duration) -> Result<Value, FetchError> {
        let response = tokio::time::timeout(timeout, self.transport.get(url, timeout))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                after_ms: timeout.as_millis() as u64,
            })??;

        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| FetchError::MalformedJson {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued outcomes and counts calls.
    struct QueuedTransport {
        outcomes: Mutex<VecDeque<Result<RawResponse, FetchError>>>,
        calls: Mutex<u32>,
    }

    impl QueuedTransport {
        fn new(outcomes: Vec<Result<RawResponse, FetchError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl HttpTransport for QueuedTransport {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<RawResponse, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(FetchError::Network {
                        url: url.to_string(),
                        reason: "exhausted".to_string(),
                    })
                })
        }
    }

    struct HangingTransport;

    #[async_trait]
    impl HttpTransport for HangingTransport {
        async fn get(&self, _url: &str, _timeout: Duration) -> Result<RawResponse, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(RawResponse::new(200, "{}"))
        }
    }

    fn network_error() -> Result<RawResponse, FetchError> {
        Err(FetchError::Network {
            url: "http://x".to_string(),
            reason: "connection reset".to_string(),
        })
    }

    fn fetcher(transport: Arc<dyn HttpTransport>) -> RetryingFetcher {
        RetryingFetcher::new(transport)
    }

    #[tokio::test]
    async fn test_retries_network_failures_then_succeeds() {
        let transport = Arc::new(QueuedTransport::new(vec![
            network_error(),
            network_error(),
            Ok(RawResponse::new(200, r#"{"_id":"p1"}"#)),
        ]));
        let policy = EndpointPolicy::new(1_000, 2, 1);

        let value = fetcher(transport.clone()).fetch("http://x", &policy).await.unwrap();
        assert_eq!(value["_id"], "p1");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_raise() {
        let transport = Arc::new(QueuedTransport::new(vec![
            network_error(),
            network_error(),
            Ok(RawResponse::new(200, "{}")),
        ]));
        let policy = EndpointPolicy::new(1_000, 1, 1);

        let err = fetcher(transport.clone()).fetch("http://x", &policy).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_retried() {
        let transport = Arc::new(QueuedTransport::new(vec![Ok(RawResponse::new(404, "not found"))]));
        let policy = EndpointPolicy::new(1_000, 3, 1);

        let err = fetcher(transport.clone()).fetch("http://x", &policy).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                url: "http://x".to_string(),
                status: 404
            }
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_not_retried() {
        let transport = Arc::new(QueuedTransport::new(vec![Ok(RawResponse::new(200, "<html>"))]));
        let policy = EndpointPolicy::new(1_000, 3, 1);

        let err = fetcher(transport.clone()).fetch("http://x", &policy).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedJson { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_enforced_around_transport() {
        let policy = EndpointPolicy::new(20, 0, 1);
        let err = fetcher(Arc::new(HangingTransport))
            .fetch("http://slow", &policy)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Timeout {
                url: "http://slow".to_string(),
                after_ms: 20
            }
        );
    }
}
