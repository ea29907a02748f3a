/// Factory: build `TokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenVerifier;

pub fn build_token_verifier(config: &Config) -> Arc<TokenVerifier> {
    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; every protected request will be rejected");
    }

    Arc::new(TokenVerifier::new(
        config.jwt_secret.as_deref(),
        config.jwt_leeway_seconds,
    ))
}
