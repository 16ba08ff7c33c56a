//! Entry routes: landing page and the `/proxy?url=` alias.

use axum::extract::Query;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use crate::codec;
use crate::http::response::ProxyError;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Rewrite Proxy</title>
</head>
<body>
<h1>Rewrite Proxy</h1>
<form action="/proxy" method="get">
<input type="url" name="url" placeholder="https://example.com" size="60" required>
<button type="submit">Go</button>
</form>
</body>
</html>
"#;

/// `GET /`
pub async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

#[derive(Debug, Deserialize)]
pub struct LegacyParams {
    url: Option<String>,
}

/// `GET /proxy?url=<raw-or-encoded>`
///
/// Always answers with a 302 to the canonical `/p/<token>` form. A value
/// starting with `http` is taken as a raw URL; anything else is decoded as a
/// token in any of the accepted alphabets.
pub async fn legacy_redirect(Query(params): Query<LegacyParams>) -> Result<Response, ProxyError> {
    let value = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ProxyError::MissingUrl)?;

    let target = if value.starts_with("http") {
        value.to_string()
    } else {
        codec::decode_lenient(value)?
    };

    Ok((StatusCode::FOUND, [(LOCATION, codec::proxy_path(&target))]).into_response())
}
