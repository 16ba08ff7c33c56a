//! Content rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Origin response (status, Content-Type, body)
//!     → ContentKind::from_content_type (one branch per response)
//!         Html   → charset.rs (decode) → html.rs (bootstrap injection)
//!                                     or legacy.rs (attribute rewriting)
//!         Css    → charset.rs (decode) → css.rs (url()/@import rewriting)
//!         Script → legacy.rs literal rewriting in legacy mode, else relayed
//!         Other  → passthrough.rs (byte-exact, bounded chunks)
//!     → client
//! ```
//!
//! # Design Decisions
//! - HTML is tokenized (lol_html) rather than regex-matched
//! - Rewritten bodies are re-emitted as UTF-8
//! - Every relative reference resolves against the final response URL
//! - Opaque content is never decoded, so binary payloads stay intact

pub mod charset;
pub mod css;
pub mod html;
pub mod legacy;
pub mod passthrough;

use thiserror::Error;
use url::Url;

use crate::codec;
use crate::config::{RewriteConfig, RewriteMode};

/// Response body category, decided from the Content-Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    Script,
    Other,
}

impl ContentKind {
    /// Classify a Content-Type header value.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::Other;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/html" | "application/xhtml+xml" => Self::Html,
            "text/css" => Self::Css,
            "application/javascript"
            | "text/javascript"
            | "application/x-javascript"
            | "application/ecmascript"
            | "text/ecmascript" => Self::Script,
            _ => Self::Other,
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Script => "script",
            Self::Other => "other",
        }
    }
}

/// Base for resolving references found in one response.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    base: Url,
}

impl RewriteContext {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        Url::parse(base).map(Self::new)
    }

    /// Final URL of the response being rewritten.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Scheme and authority of the base, e.g. `https://a.test:8443`.
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    /// Resolve a reference against the base and return its proxy path.
    ///
    /// Fragment-only references and anything that does not resolve to an
    /// http(s) URL (`data:`, `javascript:`, `mailto:`, ...) yield `None`.
    pub fn proxy_url(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() || reference.starts_with('#') {
            return None;
        }
        let resolved = self.base.join(reference).ok()?;
        matches!(resolved.scheme(), "http" | "https").then(|| codec::proxy_path(resolved.as_str()))
    }
}

/// A document could not be rewritten.
#[derive(Debug, Error)]
#[error("HTML rewriting failed: {0}")]
pub struct RewriteError(#[from] lol_html::errors::RewritingError);

/// Content rewriter configured once at startup.
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    mode: RewriteMode,
    client_script: String,
}

impl ContentRewriter {
    pub fn new(config: &RewriteConfig) -> Self {
        Self {
            mode: config.mode,
            client_script: config.client_script.clone(),
        }
    }

    pub fn mode(&self) -> RewriteMode {
        self.mode
    }

    /// Classify a response body.
    ///
    /// In legacy mode a target path ending in `.js` counts as script even
    /// when the origin labels it with a generic type.
    pub fn classify(&self, content_type: Option<&str>, target: &Url) -> ContentKind {
        match ContentKind::from_content_type(content_type) {
            ContentKind::Other
                if self.mode == RewriteMode::Legacy && target.path().ends_with(".js") =>
            {
                ContentKind::Script
            }
            kind => kind,
        }
    }

    /// Whether bodies of this kind are buffered and rewritten.
    pub fn rewrites(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Html | ContentKind::Css => true,
            ContentKind::Script => self.mode == RewriteMode::Legacy,
            ContentKind::Other => false,
        }
    }

    /// Rewrite a complete body. Only valid for kinds where [`Self::rewrites`]
    /// is true; other kinds are returned decoded but unchanged.
    pub fn rewrite(
        &self,
        kind: ContentKind,
        body: &[u8],
        content_type: Option<&str>,
        ctx: &RewriteContext,
    ) -> Result<String, RewriteError> {
        let text = charset::decode(body, content_type, kind == ContentKind::Html);
        let rewritten = match (kind, self.mode) {
            (ContentKind::Html, RewriteMode::Bootstrap) => {
                html::inject(&text, &html::bootstrap_snippet(&self.client_script, ctx))?
            }
            (ContentKind::Html, RewriteMode::Legacy) => legacy::rewrite_document(&text, ctx)?,
            (ContentKind::Css, _) => css::rewrite_css(&text, ctx).into_owned(),
            (ContentKind::Script, RewriteMode::Legacy) => {
                legacy::rewrite_script(&text, ctx).into_owned()
            }
            _ => text,
        };
        Ok(rewritten)
    }
}
