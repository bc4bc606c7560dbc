//! Request dispatcher.
//!
//! # Flow
//! ```text
//! Host header → SiteRegistry::resolve ──none──▶ welcome (200, text/plain)
//!                       │
//!                       ▼
//!         percent-decode path ──invalid UTF-8──▶ 404
//!                       │
//!                       ▼
//!         language::negotiate (path prefix, ?lang, Accept-Language, default)
//!                       │
//!                       ▼
//!         TenantHandler::serve(path, language) ──none──▶ 404
//!                       │
//!                       ▼
//!         200 text/html, Content-Language
//! ```

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::Response,
};

use crate::http::language::negotiate;
use crate::http::request::{accept_language, decoded_path, request_host, request_id};
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let host = request_host(&request);

    let Some(handler) = state.sites.resolve(host) else {
        tracing::debug!(request_id = %request_id(&request), host = %host, "No tenant matched, serving welcome");
        metrics::record_request(metrics::NO_TENANT, 200, start);
        return response::welcome(&state.welcome.load());
    };
    let tenant = handler.tenant();

    if method != Method::GET && method != Method::HEAD {
        metrics::record_request(tenant.name(), 405, start);
        return response::method_not_allowed();
    }

    let Some(path) = decoded_path(&request) else {
        tracing::debug!(request_id = %request_id(&request), tenant = %tenant.name(), "Request path is not UTF-8");
        metrics::record_request(tenant.name(), 404, start);
        return response::not_found();
    };

    let negotiated = negotiate(&tenant, &path, request.uri().query(), accept_language(&request));
    let response = match handler.serve(&negotiated.path, &negotiated.language) {
        Some(html) => response::page(html, &negotiated.language, method != Method::HEAD),
        None => {
            tracing::debug!(
                request_id = %request_id(&request),
                tenant = %tenant.name(),
                path = %negotiated.path,
                language = %negotiated.language,
                "No page for path and language"
            );
            response::not_found()
        }
    };

    metrics::record_request(tenant.name(), response.status().as_u16(), start);
    response
}
