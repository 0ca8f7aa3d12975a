//! CORS-injecting forwarding proxy for browser access to a WebDAV NAS share.
//!
//! Browser clients cannot call the NAS directly (it speaks no CORS), so this
//! proxy relays their requests and attaches the cross-origin headers.
//! Credentials are supplied per request by the caller and never stored
//! server-side; the proxy holds no state across requests.

pub mod config;
pub mod credentials;
pub mod error;
pub mod proxy;
pub mod webdav;

pub use config::Config;
pub use credentials::Credentials;
pub use error::ProxyError;
pub use proxy::ProxyServer;
pub use webdav::FileEntry;
