//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id, also forwarded upstream)
//! - Access logging / request tracing (TraceLayer)
//! - Outer request deadline (the upstream timeout fires first and yields 502)
//!
//! The body size limit is enforced where the body is read (`api::handlers::proxy`), so an
//! oversized body gets the same JSON error as every other gateway failure.

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::header::HeaderName;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::AppError;

/// Apply HTTP-level middleware to the given Router.
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                AppError::Timeout
            } else {
                tracing::error!(error = %err, "unhandled middleware error");
                AppError::Internal
            }
        }))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}
