//! ゲートウェイの URL 構造を定義
//!
//! - /health
//! - /api/auth/...      (認証なし)
//! - /api/paciente/...  (認証あり)
//! - /api/consulta/...  (認証あり)
//!
//! Bearer が必要な範囲はここで route_layer を掛ける

use axum::{
    Router,
    extract::{Request, State},
    routing::{any, get},
};

use crate::api::handlers::{health::health, proxy::proxy};
use crate::error::AppError;
use crate::middleware;
use crate::services::proxy::Service;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = upstream_routes(&state, Service::Auth);

    let protected = upstream_routes(&state, Service::Paciente)
        .merge(upstream_routes(&state, Service::Consulta));
    let protected = middleware::auth::access::apply(protected, state);

    Router::new()
        .route("/health", get(health))
        .merge(public)
        .merge(protected)
        .fallback(not_found)
}

fn upstream_routes(state: &AppState, service: Service) -> Router<AppState> {
    let mount = state.upstreams.get(service).mount;

    let handler = move |State(state): State<AppState>, req: Request| async move {
        proxy(&state, state.upstreams.get(service), req).await
    };

    Router::new()
        .route(mount, any(handler))
        .route(&format!("{mount}/"), any(handler))
        .route(&format!("{mount}/{{*rest}}"), any(handler))
}

async fn not_found() -> AppError {
    AppError::NotFound
}
