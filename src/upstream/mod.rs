//! Upstream (origin) subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator
//!     → client.rs (reqwest, redirects disabled, fetch deadline)
//!     → origin
//!     → error.rs (timeout → 504, connect → 502, other → 500)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every fetch has a deadline
//! - No retries: each request maps to exactly one origin fetch
//! - Certificate verification is off by default and controlled by config

pub mod client;
pub mod error;

pub use client::{BufferedBody, UpstreamClient};
pub use error::UpstreamError;
