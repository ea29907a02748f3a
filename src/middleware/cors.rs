//! CORS policy for browser clients.
//!
//! Note:
//! - CORS is enforced by browsers; it is not an access control for this gateway.
//! - This middleware should be applied at the Router level (not inside handlers).
//!
//! Policy:
//! - Default: permissive (Allow-Origin: *), WITHOUT credentials.
//! - `CORS_ALLOWED_ORIGINS` set: exact-match allowlist, WITHOUT credentials.

use axum::Router;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

/// Apply CORS policy to the given Router.
///
/// IMPORTANT:
/// - Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn apply(router: Router, config: &Config) -> Router {
    let cors = if config.cors_allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
            allowed.iter().any(|v| v == origin)
        });

        CorsLayer::new().allow_origin(allow_origin)
    }
    .allow_methods([
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    // The front end sends arbitrary JSON/form headers; mirror them like a permissive proxy.
    .allow_headers(Any)
    .max_age(std::time::Duration::from_secs(60 * 10));

    router.layer(cors)
}
