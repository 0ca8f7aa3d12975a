//! Proxy server module.
//!
//! # Module Structure
//!
//! - `server` - ProxyServer struct and accept loop
//! - `handler` - request classification and per-action handling
//! - `forwarding` - outbound call execution and error responses
//! - `client` - shared HTTP client construction
//! - `headers` - CORS response headers

mod client;
mod forwarding;
mod handler;
mod headers;
mod server;

#[cfg(test)]
mod tests;

// Re-export public API types
#[allow(unused_imports)]
pub use forwarding::ForwardOutcome;
#[allow(unused_imports)]
pub use handler::{classify, parse_query, InvalidReason, ProxyAction, PROXY_PATH};
#[allow(unused_imports)]
pub use headers::CorsExt;
pub use server::ProxyServer;
