use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::application::use_cases::auth::register::RegisterError;
use crate::application::use_cases::auth::update_account::UpdateAccountError;
use crate::application::use_cases::posts::update_post::PostAccessError;

/// One-time user-facing notification, carried inline in the JSON response
/// (the rendered-page flash queue of the classic server-side app).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Flash {
    pub message: String,
    pub category: &'static str,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: "success",
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: "info",
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: "warning",
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: "danger",
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, flash) = match &self {
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unprocessable Entity",
                Some(Flash::danger(msg.clone())),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found", None),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                "Conflict",
                Some(Flash::danger(msg.clone())),
            ),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "request_failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        };
        let message = match &self {
            ApiError::Internal(_) => "something went wrong".to_string(),
            other => other.to_string(),
        };
        (
            status,
            Json(ErrorBody {
                error,
                message,
                flash,
            }),
        )
            .into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl From<RegisterError> for ApiError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::EmailTaken | RegisterError::UsernameTaken => {
                ApiError::Conflict(err.to_string())
            }
            RegisterError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl From<UpdateAccountError> for ApiError {
    fn from(err: UpdateAccountError) -> Self {
        match err {
            UpdateAccountError::NotFound => ApiError::NotFound("account not found"),
            UpdateAccountError::EmailTaken | UpdateAccountError::UsernameTaken => {
                ApiError::Conflict(err.to_string())
            }
            UpdateAccountError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl From<PostAccessError> for ApiError {
    fn from(err: PostAccessError) -> Self {
        match err {
            PostAccessError::NotFound => ApiError::NotFound("post not found"),
            PostAccessError::Forbidden => ApiError::Forbidden("only the author may do that"),
            PostAccessError::Other(e) => ApiError::Internal(e),
        }
    }
}
