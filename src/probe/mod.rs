//! Landing-page prober.
//!
//! One GET per resolved URL, following redirects, bounded by a per-request
//! timeout. The prober records what came back and never retries.

mod error;

pub use error::ProbeError;

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Default per-probe timeout in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// A completed probe: the server answered with some status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status of the final response after redirects.
    pub status: u16,
    /// URL of the final response after redirects.
    pub final_url: String,
    /// Wall-clock time from send to response headers.
    pub elapsed: Duration,
}

/// Issues landing-page GETs on a shared HTTP client.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    timeout: Duration,
}

impl Prober {
    /// Creates a prober with the default timeout.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_timeout(client, Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    /// Creates a prober with a custom timeout.
    #[must_use]
    pub fn with_timeout(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Returns the per-probe timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes `url` and reports the final status and URL.
    ///
    /// Any HTTP status, including 4xx and 5xx, is a completed probe.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] when the deadline passes,
    /// [`ProbeError::Transport`] on connection-level failures and
    /// [`ProbeError::InvalidUrl`] when `url` is not an absolute http(s) URL.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn probe(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let parsed = Url::parse(url).map_err(|_| ProbeError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::invalid_url(url));
        }

        let started = Instant::now();
        let response = self
            .client
            .get(parsed)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, started.elapsed(), e))?;
        let elapsed = started.elapsed();

        let probed = ProbeResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
            elapsed,
        };
        debug!(
            status = probed.status,
            final_url = %probed.final_url,
            elapsed_ms = elapsed.as_millis(),
            "probe completed"
        );
        Ok(probed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::failure::ErrorKind;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn prober(timeout: Duration) -> Prober {
        Prober::with_timeout(crate::build_http_client().unwrap(), timeout)
    }

    #[test]
    fn test_prober_default_timeout() {
        let prober = Prober::new(crate::build_http_client().unwrap());
        assert_eq!(prober.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_probe_rejects_invalid_url_without_network() {
        let prober = prober(Duration::from_secs(1));
        let err = tokio_test::block_on(prober.probe("not-a-valid-url")).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl { .. }));
        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[test]
    fn test_probe_rejects_non_http_scheme() {
        let prober = prober(Duration::from_secs(1));
        let err = tokio_test::block_on(prober.probe("ftp://example.com/d")).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_probe_200_without_redirect_keeps_url() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/dataset"))
            .respond_with(ResponseTemplate::new(200).set_body_string("landing"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/dataset", server.uri());
        let probed = prober(Duration::from_secs(5)).probe(&url).await.unwrap();
        assert_eq!(probed.status, 200);
        assert_eq!(probed.final_url, url);
    }

    #[tokio::test]
    async fn test_probe_follows_redirect_to_final_url() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let probed = prober(Duration::from_secs(5))
            .probe(&format!("{}/old", server.uri()))
            .await
            .unwrap();
        assert_eq!(probed.status, 200);
        assert_eq!(probed.final_url, format!("{}/new", server.uri()));
    }

    #[tokio::test]
    async fn test_probe_error_status_is_completed_probe() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let probed = prober(Duration::from_secs(5))
            .probe(&format!("{}/gone", server.uri()))
            .await
            .unwrap();
        assert_eq!(probed.status, 410);
    }

    #[tokio::test]
    async fn test_probe_timeout_is_timeout_error() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let err = prober(Duration::from_millis(200))
            .probe(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.elapsed() >= Duration::from_millis(200));
    }
}
