//! Rewriting HTTP reverse proxy.
//!
//! Any origin is reachable through `/p/<token>`, where the token is a
//! reversible encoding of the absolute target URL. Responses are relayed
//! with headers adjusted for the proxy host, redirects re-encoded, and
//! HTML/CSS rewritten so that subsequent navigation stays on the proxy.

pub mod codec;
pub mod config;
pub mod headers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
