//! Redirect Resolver.
//!
//! Upstream redirects are never followed by the proxy. The `Location`
//! header has already been re-encoded by the inbound header rules, so all
//! that is left is to drop the origin's redirect body.

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

/// Statuses treated as redirects.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Build the client-facing redirect: original status, rewritten headers,
/// empty body.
pub fn resolve(status: StatusCode, headers: HeaderMap) -> Response {
    if let Some(location) = headers.get(axum::http::header::LOCATION) {
        tracing::debug!(status = %status, location = ?location, "Relaying rewritten redirect");
    }
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
