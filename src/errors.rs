use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::JsonResponse;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    NotAuthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("Internal Server Error")]
    ServerError,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RequestErrorJsonWrapper {
    pub success: bool,
    pub message: String,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            success: false,
            message: error.to_string(),
        }
    }
}

impl RequestError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::ValidationError(_) => StatusCode::BAD_REQUEST,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden(_) => StatusCode::FORBIDDEN,
            RequestError::ServerError | RequestError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let json = match self {
            RequestError::ValidationError(message) => RequestErrorJsonWrapper::new(message),
            RequestError::NotFound(message)
            | RequestError::NotAuthorized(message)
            | RequestError::Forbidden(message) => RequestErrorJsonWrapper::new(message),
            RequestError::ServerError => RequestErrorJsonWrapper::new("Internal Server Error"),
            RequestError::DatabaseError(e) => {
                tracing::error!(error = %e, "database error");
                RequestErrorJsonWrapper::new("Internal Server Error")
            }
        };
        (self.status_code(), Json(json))
    }
}

impl From<anyhow::Error> for RequestError {
    fn from(value: anyhow::Error) -> Self {
        tracing::error!(error = ?value, "internal error");
        Self::ServerError
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

pub fn is_unique_violation(error: &RequestError) -> bool {
    if let RequestError::DatabaseError(sqlx::Error::Database(e)) = error {
        return e.message().contains("UNIQUE constraint failed");
    }
    false
}
