//! Outbound call execution.
//!
//! Exactly one outbound call is made per inbound request; its outcome is
//! normalized here so handlers map transport failures and timeouts to
//! status codes without touching hyper error internals.

use super::client::HttpClient;
use super::headers::CorsExt;
use crate::error::ProxyError;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response};
use std::convert::Infallible;
use tokio::time::Instant;
use tracing::{debug, error};

/// Result of one outbound call.
pub enum ForwardOutcome {
    /// The upstream produced a response head within the deadline.
    Success(Response<Incoming>),
    /// Connection establishment or transfer failed.
    TransportError(String),
    /// The deadline expired; the in-flight call was aborted.
    TimedOut,
}

impl ForwardOutcome {
    pub fn into_result(self) -> Result<Response<Incoming>, ProxyError> {
        match self {
            ForwardOutcome::Success(response) => Ok(response),
            ForwardOutcome::TransportError(message) => {
                Err(ProxyError::UpstreamTransport(message))
            }
            ForwardOutcome::TimedOut => Err(ProxyError::UpstreamTimeout),
        }
    }
}

/// Issue a single outbound call, bounded by `deadline`.
///
/// On expiry the in-flight request future is dropped, which cancels the
/// call and tears down the underlying connection. Never retried.
pub async fn forward(
    client: &HttpClient,
    request: Request<BoxBody<Bytes, hyper::Error>>,
    deadline: Instant,
) -> ForwardOutcome {
    debug!("Forwarding to: {}", request.uri());

    match tokio::time::timeout_at(deadline, client.request(request)).await {
        Ok(Ok(response)) => ForwardOutcome::Success(response),
        Ok(Err(err)) => {
            error!("Outbound request failed: {}", err);
            ForwardOutcome::TransportError(err.to_string())
        }
        Err(_) => {
            error!("Outbound request timed out");
            ForwardOutcome::TimedOut
        }
    }
}

/// Collect an upstream response body whole, still bounded by `deadline`.
///
/// Used by the listing action, which must parse the document as one piece.
pub async fn collect_body(body: Incoming, deadline: Instant) -> Result<Bytes, ProxyError> {
    match tokio::time::timeout_at(deadline, body.collect()).await {
        Ok(Ok(collected)) => Ok(collected.to_bytes()),
        Ok(Err(err)) => {
            error!("Failed to collect upstream response body: {}", err);
            Err(ProxyError::UpstreamTransport(err.to_string()))
        }
        Err(_) => {
            error!("Upstream response body timed out");
            Err(ProxyError::UpstreamTimeout)
        }
    }
}

/// Box a fully buffered body into the handler response body type.
pub fn full_body(bytes: Bytes) -> BoxBody<Bytes, hyper::Error> {
    BoxBody::new(Full::new(bytes).map_err(|never: Infallible| match never {}))
}

/// Plain-text response for a handling failure, CORS headers included.
pub fn error_response(err: &ProxyError) -> Response<BoxBody<Bytes, hyper::Error>> {
    let mut response = Response::builder()
        .status(err.status())
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(full_body(Bytes::from(err.body())))
        .unwrap();
    response.apply_cors();
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN;

    #[test]
    fn test_error_response_status_and_body_type() {
        let response = error_response(&ProxyError::UpstreamTimeout);
        assert_eq!(response.status(), 504);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_error_response_carries_cors() {
        let response = error_response(&ProxyError::NotFound);
        assert_eq!(response.status(), 404);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[test]
    fn test_error_response_passes_upstream_status_through() {
        let response = error_response(&ProxyError::UpstreamStatus(401));
        assert_eq!(response.status(), 401);
    }

    #[test]
    fn test_into_result_mapping() {
        assert!(matches!(
            ForwardOutcome::TimedOut.into_result(),
            Err(ProxyError::UpstreamTimeout)
        ));
        assert!(matches!(
            ForwardOutcome::TransportError("reset".into()).into_result(),
            Err(ProxyError::UpstreamTransport(_))
        ));
    }
}
