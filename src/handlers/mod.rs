mod admin;
mod auth;
mod blogs;
mod users;

pub use admin::*;
pub use auth::*;
pub use blogs::*;
pub use users::*;

use std::sync::Arc;

use axum::{
    body::HttpBody,
    extract::{FromRequest, FromRequestParts, Query},
    http::{request::Parts, Request, Uri},
    BoxError, Extension, Json,
};
use serde::de::DeserializeOwned;

use crate::{data_formats::MessageWrapper, errors::RequestError, state::AppState};

pub type JsonResult<T> = Result<Json<T>, RequestError>;

/// `Json` whose rejections come back in the error envelope.
pub struct JsonBody<T>(pub T);

/// `Query` whose rejections come back in the error envelope.
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<S, B, T> FromRequest<S, B> for JsonBody<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(RequestError::ValidationError(rejection.body_text())),
        }
    }
}

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(RequestError::ValidationError(rejection.body_text())),
        }
    }
}

// ----------------- Helper Handlers -----------------
pub async fn health(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<MessageWrapper>, RequestError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;
    Ok(Json(MessageWrapper::new("alive")))
}

pub async fn not_found(uri: Uri) -> RequestError {
    tracing::debug!(%uri, "no route");
    RequestError::NotFound("Route not found")
}
