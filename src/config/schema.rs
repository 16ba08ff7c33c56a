//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// User-Agent sent upstream when the client did not provide one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Accept header sent upstream when the client did not provide one.
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Accept-Language header sent upstream when the client did not provide one.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Root configuration for the rewriting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, static assets, body limits).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Origin fetch settings.
    pub upstream: UpstreamConfig,

    /// Content rewriting settings.
    pub rewrite: RewriteConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Directory served under `/static` (companion client script lives here).
    pub static_dir: String,

    /// Largest request body forwarded upstream, in bytes.
    pub max_request_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            static_dir: "static".to_string(),
            max_request_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for the origin to answer (and for buffered bodies to arrive), in seconds.
    pub upstream_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Server-side request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 30,
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Origin fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Skip TLS certificate verification for origins.
    ///
    /// Enabled by default so that arbitrary origins stay reachable.
    pub accept_invalid_certs: bool,

    /// Fallback User-Agent.
    pub user_agent: String,

    /// Fallback Accept.
    pub accept: String,

    /// Fallback Accept-Language.
    pub accept_language: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// Strategy used to keep HTML navigation flowing through the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    /// Inject a bootstrap snippet; the companion script rewrites at runtime.
    #[default]
    Bootstrap,
    /// Rewrite markup attributes and inline script literals server-side.
    ///
    /// Superseded by `Bootstrap`, kept for compatibility.
    Legacy,
}

/// Content rewriting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Rewriting strategy for HTML documents.
    pub mode: RewriteMode,

    /// URL of the companion client script referenced by the bootstrap snippet.
    pub client_script: String,

    /// Maximum size of a relayed body chunk, in bytes.
    pub stream_chunk_bytes: usize,

    /// Largest body buffered for rewriting; bigger bodies are relayed as-is.
    pub max_buffered_body_bytes: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            mode: RewriteMode::Bootstrap,
            client_script: "/static/inject.js".to_string(),
            stream_chunk_bytes: 8 * 1024,
            max_buffered_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
