/*
 * Responsibility
 * - upstream への転送パイプライン
 *   dispatch (suffix) → 認可 (ルールごとのロール) → ヘッダ書き換え → 転送 → relay
 * - 認証 (トークン検証) は middleware::auth::access が済ませている前提
 */
use axum::{extract::Request, response::Response};

use crate::error::AppError;
use crate::services::auth::{AuthClaims, authorize};
use crate::services::proxy::UpstreamTarget;
use crate::state::AppState;

pub async fn proxy(
    state: &AppState,
    target: &UpstreamTarget,
    req: Request,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();

    let suffix = target
        .suffix(parts.uri.path())
        .ok_or(AppError::NotFound)?;
    let rule = target.resolve(suffix);
    let claims = parts.extensions.get::<AuthClaims>();

    if target.requires_auth {
        authorize(claims, &rule.allowed_roles)?;
    }

    let body = axum::body::to_bytes(body, state.body_limit_bytes)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "failed to read request body");
            AppError::RequestBody
        })?;

    let response = state
        .forwarder
        .forward(target, rule, claims, &parts, suffix, body)
        .await?;

    Ok(response)
}
