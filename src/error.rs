use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("user not found")]
    NotFound,

    #[error("username or email already exists")]
    Conflict,

    #[error("database error: {detail}")]
    Storage { detail: String },

    #[error("database unavailable")]
    Unavailable,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Storage { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Classifies a failed statement: uniqueness violations become conflicts,
/// everything else is a storage failure carrying the database message.
impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::AcquisitionTimeout(_) => AppError::Unavailable,
            e if e.is_unique_violation() => AppError::Conflict,
            e => AppError::Storage { detail: e.detail() },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Storage { detail } => {
                error!(%detail, "database error");
                json!({ "error": "database error", "detail": detail })
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                json!({ "error": "internal error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
