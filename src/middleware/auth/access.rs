//! Bearer token verification → AuthClaims を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を HS256 で検証し、sub/cpf/email/type を取り出す
//! - 失敗時は 401 / 403 を返し、upstream には転送しない
//! - 認可 (ロール判定) は handler 側で upstream のルールに従って行う

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// 保護された upstream のルートに認証を掛ける。
///
/// `route_layer` なので、マッチしなかったパスは認証なしで 404 になる。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    // 失敗理由は verifier 側でログ済み
    let claims = state.verifier.verify(auth)?;

    tracing::debug!(
        subject = %claims.subject_id,
        role = ?claims.role,
        "bearer token verified"
    );

    // middleware → handler への受け渡し
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
