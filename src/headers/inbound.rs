//! Origin → client header shaping.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::codec;
use crate::headers::cookie::rewrite_set_cookie;

/// Origin headers never relayed to the client.
///
/// Length and encoding headers go stale once bodies are decoded or
/// rewritten; the security policies would block framing and the injected
/// bootstrap script.
pub const INBOUND_SKIP: &[&str] = &[
    "transfer-encoding",
    "content-encoding",
    "content-length",
    "connection",
    "keep-alive",
    "content-security-policy",
    "content-security-policy-report-only",
    "strict-transport-security",
    "x-frame-options",
    "x-content-type-options",
    "x-xss-protection",
    "cross-origin-opener-policy",
    "cross-origin-embedder-policy",
    "cross-origin-resource-policy",
];

fn skipped(name: &HeaderName) -> bool {
    INBOUND_SKIP.contains(&name.as_str())
}

/// Resolve a `Location` value against `target` and point it back through
/// the proxy.
///
/// Returns `None` when the value does not resolve to an http(s) URL; such
/// values are relayed untouched.
pub fn rewrite_location(location: &str, target: &Url) -> Option<String> {
    let resolved = target.join(location.trim()).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| codec::proxy_path(resolved.as_str()))
}

/// Build the header set returned to the client for a response from `target`.
pub fn inbound_headers(upstream: &HeaderMap, target: &Url) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        if skipped(name) {
            continue;
        }
        let value = if *name == header::SET_COOKIE {
            rewrite_value(value, rewrite_set_cookie)
        } else if *name == header::LOCATION {
            rewrite_value(value, |location| {
                rewrite_location(location, target).unwrap_or_else(|| location.to_string())
            })
        } else {
            value.clone()
        };
        headers.append(name.clone(), value);
    }

    headers
}

/// Apply a textual rewrite to a header value.
///
/// UTF-8 values are rewritten as text. Any other obs-text is mapped one byte
/// per char and mapped back afterwards, so the bytes the rewrite does not
/// touch come out exactly as they went in. The original value is kept only
/// when the result is not a legal header value.
fn rewrite_value(value: &HeaderValue, rewrite: impl FnOnce(&str) -> String) -> HeaderValue {
    let bytes = value.as_bytes();
    let rewritten = match std::str::from_utf8(bytes) {
        Ok(text) => rewrite(text).into_bytes(),
        Err(_) => {
            let latin1: String = bytes.iter().map(|&b| char::from(b)).collect();
            rewrite(&latin1)
                .chars()
                .filter_map(|c| u8::try_from(u32::from(c)).ok())
                .collect()
        }
    };
    HeaderValue::from_bytes(&rewritten).unwrap_or_else(|_| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Url {
        Url::parse("http://a.test/x").unwrap()
    }

    #[test]
    fn test_skip_set_removed() {
        let mut upstream = HeaderMap::new();
        for name in INBOUND_SKIP {
            upstream.insert(
                HeaderName::from_static(*name),
                HeaderValue::from_static("whatever"),
            );
        }
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        upstream.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let headers = inbound_headers(&upstream, &target());
        for name in INBOUND_SKIP {
            assert!(!headers.contains_key(*name), "{name} leaked to client");
        }
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/html");
    }

    #[test]
    fn test_relative_location_reencoded() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::LOCATION, HeaderValue::from_static("/y"));

        let headers = inbound_headers(&upstream, &target());
        let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
        let token = location.strip_prefix(codec::PROXY_PREFIX).unwrap();
        assert_eq!(codec::decode(token).unwrap(), "http://a.test/y");
    }

    #[test]
    fn test_absolute_location_reencoded() {
        let rewritten = rewrite_location("https://b.test/login?next=%2F", &target()).unwrap();
        let token = rewritten.strip_prefix("/p/").unwrap();
        assert_eq!(codec::decode(token).unwrap(), "https://b.test/login?next=%2F");
    }

    #[test]
    fn test_non_http_location_passes_through() {
        assert!(rewrite_location("mailto:someone@a.test", &target()).is_none());

        let mut upstream = HeaderMap::new();
        upstream.insert(header::LOCATION, HeaderValue::from_static("mailto:someone@a.test"));
        let headers = inbound_headers(&upstream, &target());
        assert_eq!(headers.get(header::LOCATION).unwrap(), "mailto:someone@a.test");
    }

    #[test]
    fn test_every_set_cookie_rewritten_in_order() {
        let mut upstream = HeaderMap::new();
        upstream.append(
            header::SET_COOKIE,
            HeaderValue::from_static("a=1; Domain=a.test; Secure"),
        );
        upstream.append(header::SET_COOKIE, HeaderValue::from_static("b=2; Path=/deep"));

        let headers = inbound_headers(&upstream, &target());
        let cookies: Vec<_> = headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(
            cookies,
            ["a=1; Path=/; SameSite=Lax", "b=2; Path=/; SameSite=Lax"]
        );
    }

    #[test]
    fn test_utf8_header_values_still_rewritten() {
        let mut upstream = HeaderMap::new();
        upstream.append(
            header::SET_COOKIE,
            HeaderValue::from_bytes("n=café; Domain=a.test; Secure; SameSite=Strict".as_bytes())
                .unwrap(),
        );
        upstream.insert(
            header::LOCATION,
            HeaderValue::from_bytes("/café".as_bytes()).unwrap(),
        );

        let headers = inbound_headers(&upstream, &target());

        let cookie = headers.get(header::SET_COOKIE).unwrap().as_bytes();
        assert_eq!(cookie, "n=café; Path=/; SameSite=Lax".as_bytes());

        let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
        let token = location.strip_prefix(codec::PROXY_PREFIX).unwrap();
        assert_eq!(codec::decode(token).unwrap(), "http://a.test/caf%C3%A9");
    }

    #[test]
    fn test_latin1_cookie_bytes_preserved() {
        let mut upstream = HeaderMap::new();
        upstream.append(
            header::SET_COOKIE,
            HeaderValue::from_bytes(b"n=caf\xe9; Domain=a.test; Secure").unwrap(),
        );

        let headers = inbound_headers(&upstream, &target());
        assert_eq!(
            headers.get(header::SET_COOKIE).unwrap().as_bytes(),
            b"n=caf\xe9; Path=/; SameSite=Lax"
        );
    }
}
