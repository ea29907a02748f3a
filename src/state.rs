/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - verifier: TokenVerifier, forwarder: Forwarder, upstreams: Upstreams
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 起動後は読み取り専用
 */
use std::sync::Arc;

use crate::services::auth::TokenVerifier;
use crate::services::proxy::{Forwarder, Upstreams};

#[derive(Clone, Debug)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub forwarder: Forwarder,
    pub upstreams: Arc<Upstreams>,
    pub body_limit_bytes: usize,
}

impl AppState {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        forwarder: Forwarder,
        upstreams: Arc<Upstreams>,
        body_limit_bytes: usize,
    ) -> Self {
        Self {
            verifier,
            forwarder,
            upstreams,
            body_limit_bytes,
        }
    }
}
