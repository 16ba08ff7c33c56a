//! Origin fetch client.
//!
//! # Responsibilities
//! - Send one request per proxied exchange, never following redirects
//! - Enforce the fetch deadline with Tokio's timeout facilities
//! - Optionally skip certificate verification so any origin is reachable

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::upstream::error::UpstreamError;

/// Shared HTTP client for origin fetches.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    deadline: Duration,
}

impl UpstreamClient {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        if upstream.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for origin fetches");
        }

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .danger_accept_invalid_certs(upstream.accept_invalid_certs)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(UpstreamError::Build)?;

        Ok(Self {
            client,
            deadline: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    /// Fetch deadline applied to the response head and to buffered bodies.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Send a request to the origin and wait for its response head.
    pub async fn fetch(
        &self,
        method: Method,
        target: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, UpstreamError> {
        let mut request = self.client.request(method, target).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        match tokio::time::timeout(self.deadline, request.send()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(UpstreamError::Timeout),
        }
    }

    /// Buffer a response body of at most `limit` bytes under the fetch
    /// deadline.
    ///
    /// Reading stops as soon as the limit is passed; the bytes read so far
    /// and the unread response come back as [`BufferedBody::Overflow`].
    pub async fn read_body(
        &self,
        response: reqwest::Response,
        limit: usize,
    ) -> Result<BufferedBody, UpstreamError> {
        match tokio::time::timeout(self.deadline, read_capped(response, limit)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout),
        }
    }
}

/// Outcome of [`UpstreamClient::read_body`].
#[derive(Debug)]
pub enum BufferedBody {
    Complete(Bytes),
    Overflow {
        head: Bytes,
        rest: reqwest::Response,
    },
}

async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<BufferedBody, UpstreamError> {
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        buf.extend_from_slice(&chunk);
        if buf.len() > limit {
            return Ok(BufferedBody::Overflow {
                head: Bytes::from(buf),
                rest: response,
            });
        }
    }
    Ok(BufferedBody::Complete(Bytes::from(buf)))
}
