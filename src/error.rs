use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures surfaced by the store, the access guard and the HTTP layer.
///
/// The `Display` text of each variant is the exact message returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("missing API key")]
    MissingKey,

    #[error("invalid API key")]
    InvalidKey,

    #[error("name and email are required")]
    InvalidUserInput,

    #[error("userId and title are required")]
    InvalidTodoInput,

    #[error("invalid userId")]
    InvalidReference,

    #[error("user not found")]
    UserNotFound,

    #[error("todo not found")]
    TodoNotFound,

    #[error("invalid JSON body: {0}")]
    MalformedBody(String),

    #[error("not found")]
    RouteNotFound,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingKey | ApiError::InvalidKey => StatusCode::UNAUTHORIZED,
            ApiError::InvalidUserInput
            | ApiError::InvalidTodoInput
            | ApiError::InvalidReference
            | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound | ApiError::TodoNotFound | ApiError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}
