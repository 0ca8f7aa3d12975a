//! Request classification and per-action handling.
//!
//! An inbound request resolves to exactly one [`ProxyAction`]; the preflight
//! and invalid actions are answered locally, the listing and forward actions
//! each issue one outbound call. Every failure is converted to an HTTP
//! response here; nothing crashes the connection task or leaves a request
//! unanswered.

use super::client::HttpClient;
use super::forwarding::{self, error_response, full_body};
use super::headers::CorsExt;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::ProxyError;
use crate::webdav;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode, Uri};
use std::collections::HashMap;
use std::convert::Infallible;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// The single endpoint served by the proxy.
pub const PROXY_PATH: &str = "/proxy";

/// What an inbound request asks the proxy to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyAction {
    /// CORS preflight; answered locally, no outbound call.
    Preflight,
    /// List backup files on the fixed backend.
    ListFiles,
    /// Forward to a caller-specified absolute URL.
    ForwardUrl(String),
    /// Unroutable request.
    Invalid(InvalidReason),
}

/// Why a request could not be routed. Variants map to distinct status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Path is not the proxy endpoint (404).
    NotFound,
    /// Neither `action=list` nor a non-empty `url` present (400).
    MissingParameter,
}

/// Everything a handler needs for one request.
pub struct RequestContext<'a> {
    pub http_client: &'a HttpClient,
    pub config: &'a Config,
}

/// Classify a request into its action. Pure; rules apply in order.
pub fn classify(method: &Method, path: &str, params: &HashMap<String, String>) -> ProxyAction {
    if method == Method::OPTIONS {
        return ProxyAction::Preflight;
    }
    if path != PROXY_PATH {
        return ProxyAction::Invalid(InvalidReason::NotFound);
    }
    if params.get("action").map(String::as_str) == Some("list") {
        return ProxyAction::ListFiles;
    }
    match params.get("url") {
        Some(url) if !url.is_empty() => ProxyAction::ForwardUrl(url.clone()),
        _ => ProxyAction::Invalid(InvalidReason::MissingParameter),
    }
}

/// Parse query parameters, percent-decoding values.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(q) = query {
        for pair in q.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                params.insert(
                    key.to_string(),
                    urlencoding::decode(value).unwrap_or_default().to_string(),
                );
            } else if !pair.is_empty() {
                params.insert(pair.to_string(), String::new());
            }
        }
    }
    params
}

/// Handle one inbound request end to end.
pub async fn handle_request(
    ctx: &RequestContext<'_>,
    req: Request<Incoming>,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, Infallible> {
    let method = req.method().clone();
    let params = parse_query(req.uri().query());
    let action = classify(&method, req.uri().path(), &params);

    debug!("{} {} -> {:?}", method, req.uri().path(), action);

    let response = match action {
        ProxyAction::Preflight => preflight_response(),
        ProxyAction::Invalid(InvalidReason::NotFound) => error_response(&ProxyError::NotFound),
        ProxyAction::Invalid(InvalidReason::MissingParameter) => {
            error_response(&ProxyError::MissingParameter)
        }
        ProxyAction::ListFiles => handle_list(ctx, req.headers())
            .await
            .unwrap_or_else(|err| error_response(&err)),
        ProxyAction::ForwardUrl(target) => handle_forward(ctx, req.headers(), &target)
            .await
            .unwrap_or_else(|err| error_response(&err)),
    };
    Ok(response)
}

/// Answer a CORS preflight locally.
fn preflight_response() -> Response<BoxBody<Bytes, hyper::Error>> {
    let mut response = Response::new(full_body(Bytes::new()));
    response.apply_cors();
    response
}

/// List `.json` backup files on the fixed backend via PROPFIND.
async fn handle_list(
    ctx: &RequestContext<'_>,
    headers: &HeaderMap,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, ProxyError> {
    let backend = &ctx.config.backend;
    let uri = format!("{}{}", backend.base_url(), backend.base_path);
    info!("Listing {}", uri);

    let mut builder = Request::builder()
        .method(propfind())
        .uri(uri)
        .header("depth", "1")
        .header(ACCEPT, "*/*");
    if let Some(authorization) = Credentials::resolve(headers).authorization_value() {
        builder = builder.header(AUTHORIZATION, authorization);
    }
    let request = builder.body(full_body(Bytes::new())).map_err(|err| {
        warn!("Failed to build listing request: {}", err);
        ProxyError::Internal
    })?;

    let deadline = Instant::now() + ctx.config.forward.timeout();
    let response = forwarding::forward(ctx.http_client, request, deadline)
        .await
        .into_result()?;

    let (parts, body) = response.into_parts();
    if parts.status != StatusCode::MULTI_STATUS {
        warn!("Listing request answered with {}", parts.status);
        return Err(ProxyError::UpstreamStatus(parts.status.as_u16()));
    }

    // The whole document is needed before anything can be emitted, so this
    // is the one place a response body is buffered.
    let bytes = forwarding::collect_body(body, deadline).await?;
    let document = String::from_utf8_lossy(&bytes);
    let entries = webdav::parse_multistatus(&document, &backend.base_url());
    info!("Listed {} backup files", entries.len());

    let json = serde_json::to_vec(&entries).map_err(|err| {
        warn!("Failed to serialize listing: {}", err);
        ProxyError::Internal
    })?;
    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(full_body(Bytes::from(json)))
        .unwrap();
    response.apply_cors();
    Ok(response)
}

/// Forward to a caller-specified URL, streaming the response body through.
async fn handle_forward(
    ctx: &RequestContext<'_>,
    headers: &HeaderMap,
    target: &str,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, ProxyError> {
    let uri: Uri = target.parse().map_err(|_| ProxyError::InvalidUrl)?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => return Err(ProxyError::InvalidUrl),
    }
    if uri.host().is_none() {
        return Err(ProxyError::InvalidUrl);
    }

    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(ACCEPT, "*/*");
    if let Some(authorization) = Credentials::resolve(headers).authorization_value() {
        builder = builder.header(AUTHORIZATION, authorization);
    }
    let request = builder.body(full_body(Bytes::new())).map_err(|err| {
        warn!("Failed to build forward request: {}", err);
        ProxyError::Internal
    })?;

    let deadline = Instant::now() + ctx.config.forward.timeout();
    let response = forwarding::forward(ctx.http_client, request, deadline)
        .await
        .into_result()?;

    // Status and headers pass through verbatim; the body streams without
    // buffering. Once this response is handed to hyper, a later body error
    // terminates the stream and can never become a second response.
    let (mut parts, body) = response.into_parts();
    parts.apply_cors();
    Ok(Response::from_parts(parts, BoxBody::new(body)))
}

// PROPFIND is not one of hyper's predefined methods.
fn propfind() -> Method {
    Method::from_bytes(b"PROPFIND").unwrap()
}
