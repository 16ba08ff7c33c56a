//! Proxy Orchestrator.
//!
//! # Responsibilities
//! - Decode the target from the `/p/<token>` segment and merge the query
//! - Shape outbound headers and forward the body for POST/PUT/PATCH
//! - Fetch the origin once, without following redirects
//! - Branch to the Redirect Resolver, the Content Rewriter or a streamed relay
//!
//! # Design Decisions
//! - HTML, CSS (and scripts in legacy mode) are buffered; everything else streams
//! - A failed rewrite relays the original bytes instead of failing the request
//! - Bodies over `rewrite.max_buffered_body_bytes` are relayed unmodified
//! - The query string is appended verbatim, so it must already be encoded

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{self, Stream, StreamExt};
use url::Url;

use crate::codec;
use crate::headers::{inbound_headers, outbound_headers};
use crate::http::redirect;
use crate::http::request::request_id;
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::rewrite::{passthrough, ContentKind, RewriteContext};
use crate::upstream::BufferedBody;

/// Label used for requests that never reached a content branch.
const ERROR_KIND: &str = "error";

/// `ANY /p/{token}`
pub async fn proxy_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let start = Instant::now();
    let method_label = method.to_string();

    match forward(&state, &token, uri.query(), method, headers, body).await {
        Ok((response, kind)) => {
            metrics::record_request(&method_label, response.status().as_u16(), kind.as_str(), start);
            response
        }
        Err(err) => {
            if let ProxyError::Upstream(upstream) = &err {
                metrics::record_upstream_error(upstream.kind());
            }
            metrics::record_request(&method_label, err.status().as_u16(), ERROR_KIND, start);
            err.into_response()
        }
    }
}

/// Decode a token into an http(s) URL and append the inbound query string.
pub fn resolve_target(token: &str, query: Option<&str>) -> Result<Url, ProxyError> {
    let mut target = codec::decode(token)?;
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push(if target.contains('?') { '&' } else { '?' });
        target.push_str(query);
    }

    let url = Url::parse(&target)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProxyError::InvalidScheme(other.to_owned())),
    }
}

/// Only these methods carry a body upstream.
fn forwards_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Whether a response must be relayed untouched regardless of its type.
fn bodyless(method: &Method, status: StatusCode) -> bool {
    *method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// `text/html; charset=windows-1252` → `text/html; charset=utf-8`.
fn utf8_content_type(content_type: &str) -> Option<HeaderValue> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    HeaderValue::from_str(&format!("{essence}; charset=utf-8")).ok()
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Relay an origin body byte-for-byte in bounded chunks.
fn relay<S>(status: StatusCode, headers: HeaderMap, body: S, chunk: usize) -> Response
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let stream = passthrough::bounded_chunks(body, chunk);
    build_response(status, headers, Body::from_stream(stream))
}

async fn forward(
    state: &AppState,
    token: &str,
    query: Option<&str>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<(Response, ContentKind), ProxyError> {
    let target = resolve_target(token, query)?;

    tracing::debug!(
        request_id = %request_id(&headers),
        method = %method,
        url = %target,
        "Proxying request"
    );

    let body = if forwards_body(&method) {
        let limit = state.config.listener.max_request_body_bytes;
        let bytes: Bytes = axum::body::to_bytes(body, limit)
            .await
            .map_err(|_| ProxyError::RequestBody)?;
        Some(bytes)
    } else {
        None
    };

    let outbound = outbound_headers(&headers, &target, &state.config.upstream);
    let upstream = state
        .upstream
        .fetch(method.clone(), target.clone(), outbound, body)
        .await?;

    let status = upstream.status();
    let mut response_headers = inbound_headers(upstream.headers(), &target);

    if redirect::is_redirect(status) {
        return Ok((redirect::resolve(status, response_headers), ContentKind::Other));
    }

    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let kind = state.rewriter.classify(content_type.as_deref(), upstream.url());
    let chunk = state.config.rewrite.stream_chunk_bytes;

    if bodyless(&method, status) || !state.rewriter.rewrites(kind) {
        return Ok((relay(status, response_headers, upstream.bytes_stream(), chunk), kind));
    }

    let limit = state.config.rewrite.max_buffered_body_bytes;
    if upstream.content_length().is_some_and(|len| len > limit as u64) {
        tracing::warn!(
            url = %upstream.url(),
            limit,
            "Body too large to rewrite, relaying unmodified"
        );
        return Ok((relay(status, response_headers, upstream.bytes_stream(), chunk), kind));
    }

    let ctx = RewriteContext::new(upstream.url().clone());
    let raw = match state.upstream.read_body(upstream, limit).await? {
        BufferedBody::Complete(raw) => raw,
        BufferedBody::Overflow { head, rest } => {
            tracing::warn!(
                url = %ctx.base(),
                limit,
                "Body too large to rewrite, relaying unmodified"
            );
            let body = stream::iter([Ok(head)]).chain(rest.bytes_stream());
            return Ok((relay(status, response_headers, body, chunk), kind));
        }
    };

    let body = match state
        .rewriter
        .rewrite(kind, &raw, content_type.as_deref(), &ctx)
    {
        Ok(text) => {
            if let Some(value) = content_type.as_deref().and_then(utf8_content_type) {
                response_headers.insert(CONTENT_TYPE, value);
            }
            Body::from(text)
        }
        Err(e) => {
            tracing::warn!(
                url = %ctx.base(),
                kind = kind.as_str(),
                error = %e,
                "Rewrite failed, relaying original body"
            );
            Body::from(raw)
        }
    };

    Ok((build_response(status, response_headers, body), kind))
}
