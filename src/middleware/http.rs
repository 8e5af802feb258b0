//! Transport-level layers wrapped around the whole API.
//!
//! - `x-request-id`: generated when missing, echoed on every response (timeouts included)
//! - access log span carrying method, path and request id
//! - whole-request timeout → 408 with the usual `{ "message" }` body
//! - request body limit
//!
//! The timeout also bounds the identity lookup: when it fires, the request
//! future (binder included) is dropped.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, header::HeaderName};
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::error::AppError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// POS clients only send small JSON payloads
const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub fn apply(router: Router, request_timeout: Duration) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    // 外側から: request-id 付与 → trace → request-id 返却 → error 変換 → timeout → body limit
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<Elapsed>() {
                AppError::RequestTimeout
            } else {
                tracing::error!(error = %err, "unhandled middleware error");
                AppError::Internal
            }
        }))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));

    router.layer(layers)
}

fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %req.method(),
        path = req.uri().path(),
        request_id,
    )
}
