/*
 * Responsibility
 * - ゲートウェイ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body `{message}` / `{message, detail}`)
 * - AuthError / UpstreamError を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::proxy::UpstreamError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("route not found")]
    NotFound,
    #[error("request body too large")]
    RequestBody,
    #[error("gateway timeout")]
    Timeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(
                AuthError::MissingToken | AuthError::MissingSubject | AuthError::Unauthenticated,
            ) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::InvalidToken | AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::RequestBody => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Upstream(err) => Some(err.detail()),
            _ => None,
        };

        let body = ErrorResponse {
            message: self.to_string(),
            detail,
        };

        (status, Json(body)).into_response()
    }
}
