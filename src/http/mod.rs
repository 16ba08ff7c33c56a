//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, request timeout)
//!     → entry.rs (`/`, `/proxy?url=` alias)
//!     → proxy.rs (`/p/<token>`: decode target, fetch origin)
//!         → redirect.rs (3xx: rewritten Location, empty body)
//!         → rewrite subsystem (HTML/CSS) or streamed relay
//!     → response.rs (failures mapped to status codes)
//!     → Send to client
//! ```

pub mod entry;
pub mod proxy;
pub mod redirect;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
