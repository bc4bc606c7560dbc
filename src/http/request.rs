//! Request identification and inspection.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client sent none
//! - Extract routing-relevant information (host, path, query, Accept-Language)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - HTTP/2 requests carry the host in the URI authority, not a Host header

use std::borrow::Cow;

use axum::http::{header, HeaderValue, Request};
use percent_encoding::percent_decode_str;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

pub fn set_request_id_layer() -> SetRequestIdLayer<UuidRequestId> {
    SetRequestIdLayer::x_request_id(UuidRequestId)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// The request ID, or `"unknown"` before the layer ran.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Host as sent by the client, port included. Empty when absent.
pub fn request_host<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
}

/// Percent-decoded request path. `None` when the bytes are not UTF-8.
pub fn decoded_path<B>(request: &Request<B>) -> Option<Cow<'_, str>> {
    percent_decode_str(request.uri().path()).decode_utf8().ok()
}

pub fn accept_language<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_host() {
        let req = Request::builder()
            .uri("/")
            .header("Host", "acme.test:8080")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&req), "acme.test:8080");

        let req = Request::builder()
            .uri("http://h2.acme.test/path")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&req), "h2.acme.test");

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(request_host(&req), "");
        assert_eq!(request_id(&req), "unknown");
    }

    #[test]
    fn test_decoded_path() {
        let req = Request::builder().uri("/%C3%BCber/a%20b").body(Body::empty()).unwrap();
        assert_eq!(decoded_path(&req).as_deref(), Some("/über/a b"));

        let req = Request::builder().uri("/plain").body(Body::empty()).unwrap();
        assert!(matches!(decoded_path(&req), Some(Cow::Borrowed("/plain"))));

        let req = Request::builder().uri("/%FF%FE").body(Body::empty()).unwrap();
        assert_eq!(decoded_path(&req), None);
    }

    #[test]
    fn test_uuid_request_id() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let id = UuidRequestId.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
