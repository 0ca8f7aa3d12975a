//! ProxyServer struct and accept loop.

use super::client::{create_http_client, HttpClient};
use super::handler::{handle_request, RequestContext};
use crate::config::Config;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// The proxy server: immutable configuration plus the shared outbound
/// client. Everything else is allocated per request.
pub struct ProxyServer {
    config: Arc<Config>,
    http_client: HttpClient,
}

impl ProxyServer {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http_client: create_http_client(),
        }
    }

    /// Accept connections and handle requests until the process exits.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.listen.port));
        let listener = TcpListener::bind(addr).await?;

        info!("Listening on http://{}", addr);
        info!(
            "Proxying to {} (listing {})",
            self.config.backend.base_url(),
            self.config.backend.base_path
        );

        let server = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let server = Arc::clone(&server);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = Arc::clone(&server);
                    async move { server.handle_request_internal(req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }

    async fn handle_request_internal(
        &self,
        req: hyper::Request<Incoming>,
    ) -> Result<hyper::Response<BoxBody<Bytes, hyper::Error>>, Infallible> {
        let ctx = RequestContext {
            http_client: &self.http_client,
            config: &self.config,
        };
        handle_request(&ctx, req).await
    }
}
