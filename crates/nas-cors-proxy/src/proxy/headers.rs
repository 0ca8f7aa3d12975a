//! CORS response headers.
//!
//! Every response leaving the proxy carries the same cross-origin headers,
//! error responses included. Compile-time static values keep insertion
//! infallible, with no runtime `.parse().unwrap()` calls.

use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::http::response::Parts;
use hyper::Response;

pub static ALLOW_ORIGIN: HeaderValue = HeaderValue::from_static("*");
pub static ALLOW_METHODS: HeaderValue = HeaderValue::from_static("GET, POST, OPTIONS");
pub static ALLOW_HEADERS: HeaderValue =
    HeaderValue::from_static("Authorization, Content-Type, X-NAS-Username, X-NAS-Password");

/// Extension trait attaching the proxy's CORS headers to a response.
pub trait CorsExt {
    /// Insert the allow-origin/allow-methods/allow-headers triple,
    /// replacing any values the upstream already set.
    fn apply_cors(&mut self);
}

impl<B> CorsExt for Response<B> {
    fn apply_cors(&mut self) {
        insert_cors(self.headers_mut());
    }
}

impl CorsExt for Parts {
    fn apply_cors(&mut self) {
        insert_cors(&mut self.headers);
    }
}

fn insert_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS.clone());
}
