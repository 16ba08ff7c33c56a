//! Text decoding for rewritten bodies.
//!
//! Resolution order: `charset` parameter of the Content-Type, byte order
//! mark, `<meta>` declaration near the top of an HTML document, then UTF-8.
//! Undecodable bytes become U+FFFD rather than failing the response.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// How far into an HTML document a `<meta>` charset declaration is honored.
const META_SNIFF_LIMIT: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("valid meta charset regex")
});

/// `charset` parameter of a Content-Type value, if any.
pub fn declared_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
    })
}

fn sniff_meta(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_LIMIT)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

/// Pick the encoding for a body.
pub fn detect(body: &[u8], content_type: Option<&str>, sniff_html: bool) -> &'static Encoding {
    if let Some(encoding) = content_type
        .and_then(declared_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }
    if sniff_html {
        if let Some(encoding) = sniff_meta(body) {
            return encoding;
        }
    }
    UTF_8
}

/// Decode a body to text, substituting undecodable bytes.
pub fn decode(body: &[u8], content_type: Option<&str>, sniff_html: bool) -> String {
    let encoding = detect(body, content_type, sniff_html);
    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Body contained undecodable bytes");
    }
    text.into_owned()
}
