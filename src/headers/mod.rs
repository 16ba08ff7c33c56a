//! Header transformation subsystem.
//!
//! # Data Flow
//! ```text
//! Client request headers + target URL
//!     → outbound.rs (drop hop-by-hop/size headers, force Host,
//!                    rewrite Referer, fill browser defaults)
//!     → origin
//!
//! Origin response headers + target URL
//!     → inbound.rs (drop stale length/encoding and security headers,
//!                   re-encode Location through the proxy)
//!     → cookie.rs (re-scope every Set-Cookie to the proxy host)
//!     → client
//! ```
//!
//! # Design Decisions
//! - Names compare case-insensitively (`HeaderName` is lowercase)
//! - Duplicate headers are preserved in their original order
//! - Values that cannot be rewritten as text are relayed unchanged

pub mod cookie;
pub mod inbound;
pub mod outbound;

pub use cookie::rewrite_set_cookie;
pub use inbound::{inbound_headers, rewrite_location, INBOUND_SKIP};
pub use outbound::{authority, outbound_headers, OUTBOUND_SKIP};
