//! Tests for the proxy module.
//!
//! Unit tests for classification and response shaping live next to their
//! modules; the tests here exercise the forwarding path against real
//! sockets.

#[cfg(test)]
mod forwarding_tests {
    use crate::proxy::client::create_http_client;
    use crate::proxy::forwarding::{forward, full_body, ForwardOutcome};
    use hyper::body::Bytes;
    use hyper::Request;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_forward_times_out_and_aborts() {
        // A backend that accepts the connection and never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let client = create_http_client();
        let request = Request::builder()
            .uri(format!("http://{addr}/x"))
            .body(full_body(Bytes::new()))
            .unwrap();

        let deadline = Instant::now() + Duration::from_millis(200);
        let started = Instant::now();
        match forward(&client, request, deadline).await {
            ForwardOutcome::TimedOut => {}
            ForwardOutcome::Success(_) => panic!("expected timeout, got response"),
            ForwardOutcome::TransportError(message) => {
                panic!("expected timeout, got transport error: {message}")
            }
        }
        // The call returned at the deadline, not after the backend's sleep.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_forward_connection_refused_is_transport_error() {
        // Bind then drop to obtain a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = create_http_client();
        let request = Request::builder()
            .uri(format!("http://{addr}/x"))
            .body(full_body(Bytes::new()))
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        match forward(&client, request, deadline).await {
            ForwardOutcome::TransportError(_) => {}
            ForwardOutcome::Success(_) => panic!("expected transport error, got response"),
            ForwardOutcome::TimedOut => panic!("expected transport error, got timeout"),
        }
    }
}

#[cfg(test)]
mod action_tests {
    use crate::proxy::{classify, parse_query, InvalidReason, ProxyAction};
    use hyper::Method;

    #[test]
    fn test_full_uri_classification_round_trip() {
        let uri: hyper::Uri = "http://localhost:8000/proxy?action=list".parse().unwrap();
        let params = parse_query(uri.query());
        let action = classify(&Method::GET, uri.path(), &params);
        assert_eq!(action, ProxyAction::ListFiles);
    }

    #[test]
    fn test_encoded_url_parameter_round_trip() {
        let uri: hyper::Uri = "http://localhost:8000/proxy?url=http%3A%2F%2F192.168.31.2%3A5005%2FDataBackup%2Fa.json"
            .parse()
            .unwrap();
        let params = parse_query(uri.query());
        match classify(&Method::GET, uri.path(), &params) {
            ProxyAction::ForwardUrl(target) => {
                assert_eq!(target, "http://192.168.31.2:5005/DataBackup/a.json");
            }
            other => panic!("expected ForwardUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_root_path_is_not_found() {
        let action = classify(&Method::GET, "/", &Default::default());
        assert_eq!(action, ProxyAction::Invalid(InvalidReason::NotFound));
    }
}
