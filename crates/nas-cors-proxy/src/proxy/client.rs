//! HTTP client creation and configuration.

use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

/// Type alias for the HTTP client used for outbound calls.
pub type HttpClient = Client<
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
    BoxBody<Bytes, hyper::Error>,
>;

/// Create the shared HTTP client (HTTP/1.1, plaintext or TLS by scheme).
///
/// `url=` targets may use either scheme; the listing backend is always
/// reached over plain HTTP. Idle connections are never pooled: the proxy
/// keeps no state across requests, open connections included.
pub fn create_http_client() -> HttpClient {
    let mut http_connector = hyper_util::client::legacy::connect::HttpConnector::new();
    http_connector.enforce_http(false); // Allow both HTTP and HTTPS

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .expect("Failed to load native root certificates")
        .https_or_http()
        .enable_http1()
        .wrap_connector(http_connector);

    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(https_connector)
}
