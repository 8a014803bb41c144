use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::cache::CacheError;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 调用方传入的参数不合法（例如既没有群组ID也没有群组名称）
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("permission denied")]
    PermissionDenied,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidArgument(msg) => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                msg.clone(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "未授权访问".to_string(),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                error_codes::PERMISSION_DENIED,
                "权限不足".to_string(),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                format!("{} not found", what),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, error_codes::CONFLICT, msg.clone()),
            AppError::Database(_) | AppError::Cache(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "内部服务器错误".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, error_to_api_response::<()>(code, message)).into_response()
    }
}
