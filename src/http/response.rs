//! Response construction.
//!
//! # Responsibilities
//! - Rendered page: 200, `text/html`, `Content-Language` echoing the negotiated language
//! - Not found, method not allowed, fallback welcome
//! - Map failures while building a response to 500
//!
//! # Design Decisions
//! - Bodies are pre-rendered `Bytes`, cloned not copied
//! - HEAD gets the GET headers and an empty body

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

const HTML: &str = "text/html; charset=utf-8";

pub fn page(html: Bytes, language: &str, include_body: bool) -> Response {
    let length = html.len();
    let body = if include_body { Body::from(html) } else { Body::empty() };
    let built = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HTML)
        .header(header::CONTENT_LANGUAGE, language)
        .header(header::CONTENT_LENGTH, length)
        .body(body);
    match built {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(language = %language, error = %e, "Failed to build page response");
            internal_error()
        }
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

pub fn method_not_allowed() -> Response {
    let mut response = (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}

pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Plain-text response for hosts that match no tenant.
pub fn welcome(message: &str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        message.to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_headers() {
        let response = page(Bytes::from_static(b"<p>hi</p>"), "fr", true);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LANGUAGE], "fr");
        assert_eq!(response.headers()[header::CONTENT_TYPE], HTML);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "9");
    }

    #[test]
    fn test_unencodable_language_is_a_server_error() {
        let response = page(Bytes::from_static(b"x"), "bad\nvalue", true);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(method_not_allowed().headers()[header::ALLOW], "GET, HEAD");
        let response = welcome("hello");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    }
}
