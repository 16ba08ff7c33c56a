//! Client → origin header shaping.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use url::{Position, Url};

use crate::config::UpstreamConfig;

/// Client headers never forwarded to the origin.
pub const OUTBOUND_SKIP: &[&str] = &[
    "host",
    "connection",
    "accept-encoding",
    "content-length",
    "transfer-encoding",
    "upgrade-insecure-requests",
];

fn skipped(name: &HeaderName) -> bool {
    // HeaderName is always lowercase
    OUTBOUND_SKIP.contains(&name.as_str())
}

/// Authority (`host[:port]`) of a target URL.
pub fn authority(target: &Url) -> &str {
    &target[Position::BeforeHost..Position::AfterPort]
}

/// Build the header set sent to the origin for `target`.
///
/// Client headers keep their order; `Host` is forced to the target authority,
/// `Referer` (when present) becomes the target URL, and browser-like
/// defaults fill in a missing `User-Agent`, `Accept` or `Accept-Language`.
pub fn outbound_headers(client: &HeaderMap, target: &Url, defaults: &UpstreamConfig) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(client.len() + 4);

    for (name, value) in client {
        if skipped(name) {
            continue;
        }
        if *name == header::REFERER {
            if let Ok(referer) = HeaderValue::from_str(target.as_str()) {
                headers.append(header::REFERER, referer);
            }
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Ok(host) = HeaderValue::from_str(authority(target)) {
        headers.insert(header::HOST, host);
    }

    let fallbacks = [
        (header::USER_AGENT, &defaults.user_agent),
        (header::ACCEPT, &defaults.accept),
        (header::ACCEPT_LANGUAGE, &defaults.accept_language),
    ];
    for (name, value) in fallbacks {
        if headers.contains_key(&name) {
            continue;
        }
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Url {
        Url::parse("https://origin.test:8443/docs/page?x=1").unwrap()
    }

    fn client_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("proxy.local:8080"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("accept-encoding", HeaderValue::from_static("gzip, br"));
        headers.insert("content-length", HeaderValue::from_static("12"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
        headers.insert("cookie", HeaderValue::from_static("sid=abc"));
        headers.append("x-custom", HeaderValue::from_static("one"));
        headers.append("x-custom", HeaderValue::from_static("two"));
        headers
    }

    #[test]
    fn test_skip_set_removed() {
        let headers = outbound_headers(&client_headers(), &target(), &UpstreamConfig::default());
        for name in OUTBOUND_SKIP.iter().filter(|n| **n != "host") {
            assert!(!headers.contains_key(*name), "{name} leaked upstream");
        }
        assert_eq!(headers.get("cookie").unwrap(), "sid=abc");
        let custom: Vec<_> = headers.get_all("x-custom").iter().collect();
        assert_eq!(custom, ["one", "two"]);
    }

    #[test]
    fn test_host_forced_to_target_authority() {
        let headers = outbound_headers(&client_headers(), &target(), &UpstreamConfig::default());
        assert_eq!(headers.get_all(header::HOST).iter().count(), 1);
        assert_eq!(headers.get(header::HOST).unwrap(), "origin.test:8443");

        let plain = Url::parse("http://a.test/x").unwrap();
        let headers = outbound_headers(&HeaderMap::new(), &plain, &UpstreamConfig::default());
        assert_eq!(headers.get(header::HOST).unwrap(), "a.test");
    }

    #[test]
    fn test_referer_rewritten_only_when_present() {
        let headers = outbound_headers(&client_headers(), &target(), &UpstreamConfig::default());
        assert!(headers.get(header::REFERER).is_none());

        let mut client = client_headers();
        client.insert(
            header::REFERER,
            HeaderValue::from_static("http://proxy.local:8080/p/abc"),
        );
        let headers = outbound_headers(&client, &target(), &UpstreamConfig::default());
        assert_eq!(
            headers.get(header::REFERER).unwrap(),
            "https://origin.test:8443/docs/page?x=1"
        );
    }

    #[test]
    fn test_defaults_only_fill_gaps() {
        let defaults = UpstreamConfig::default();
        let headers = outbound_headers(&HeaderMap::new(), &target(), &defaults);
        assert_eq!(headers.get(header::USER_AGENT).unwrap(), defaults.user_agent.as_str());
        assert_eq!(headers.get(header::ACCEPT).unwrap(), defaults.accept.as_str());
        assert_eq!(
            headers.get(header::ACCEPT_LANGUAGE).unwrap(),
            defaults.accept_language.as_str()
        );

        let mut client = HeaderMap::new();
        client.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        client.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("ja"));
        let headers = outbound_headers(&client, &target(), &defaults);
        assert_eq!(headers.get(header::USER_AGENT).unwrap(), "curl/8.0");
        assert_eq!(headers.get(header::ACCEPT_LANGUAGE).unwrap(), "ja");
        assert_eq!(headers.get(header::ACCEPT).unwrap(), defaults.accept.as_str());
    }
}
