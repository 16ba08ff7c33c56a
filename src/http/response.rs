//! Error-to-response mapping.
//!
//! # Responsibilities
//! - Collect every way a proxied exchange can fail into one error type
//! - Map each failure to the status code the client sees
//! - Surface failures as short text bodies
//!
//! # Design Decisions
//! - Client mistakes (bad token, bad scheme, missing `url`) are 400s
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Rewriting failures are not errors here; the raw body is relayed instead

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::codec::DecodeError;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid proxy token: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid target URL: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("unsupported scheme: {0}")]
    InvalidScheme(String),

    #[error("missing url parameter")]
    MissingUrl,

    #[error("request body too large or unreadable")]
    RequestBody,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::InvalidTarget(_) | Self::InvalidScheme(_) | Self::MissingUrl => {
                StatusCode::BAD_REQUEST
            }
            Self::RequestBody => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(err) => err.status(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "Proxy request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Rejected proxy request");
        }
        (status, self.to_string()).into_response()
    }
}
