//! Proxy token codec.
//!
//! # Data Flow
//! ```text
//! absolute URL ──encode──▶ token ──▶ "/p/<token>" (one path segment)
//! "/p/<token>" ──▶ token ──decode──▶ absolute URL
//! ```
//!
//! # Design Decisions
//! - Tokens are base64url without padding: `-` and `_` replace `+` and `/`,
//!   so a token never contains a routing-significant `/`
//! - Decoding accepts both padded and unpadded input
//! - Encoding is a pure function of the URL text (deterministic, no length cap)
//! - The codec operates on text; URL validation happens in the orchestrator

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use thiserror::Error;

/// Path prefix under which proxy tokens are routed.
pub const PROXY_PREFIX: &str = "/p/";

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Token could not be turned back into a URL.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed proxy token: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("proxy token does not contain UTF-8 text")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode an absolute URL into a path-safe token.
pub fn encode(url: &str) -> String {
    TOKEN_ENGINE.encode(url.as_bytes())
}

/// Decode a token produced by [`encode`].
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let bytes = TOKEN_ENGINE.decode(token.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode a token that may come from older link formats.
///
/// Accepts canonical tokens, standard base64 (with `+` possibly turned into
/// a space by form decoding) and the `-`/`:` alternate alphabet.
pub fn decode_lenient(token: &str) -> Result<String, DecodeError> {
    let normalized: String = token
        .trim()
        .chars()
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' | ':' => '_',
            other => other,
        })
        .collect();
    decode(&normalized)
}

/// Proxy-relative path for an absolute URL: `/p/<token>`.
pub fn proxy_path(url: &str) -> String {
    format!("{PROXY_PREFIX}{}", encode(url))
}
