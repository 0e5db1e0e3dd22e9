use std::sync::Arc;

use axum::{extract::Path, Extension, Json};

use super::{JsonBody, JsonResult};
use crate::{
    authentication::AuthUser,
    data_formats::{
        BlogResponse, DataWrapper, ListWrapper, ProfileResponse, ProfileWithBlogsResponse,
        UpdateProfileRequest, UserResponse,
    },
    db_helpers::{
        get_user_by_id, list_blogs_by_author_in_db, list_liked_blogs_in_db, update_profile_in_db,
    },
    errors::RequestError,
    models::{BlogStatus, User},
    state::AppState,
};

async fn require_user(state: &AppState, id: i64) -> Result<User, RequestError> {
    match get_user_by_id(&state.pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

// ----------------- Profile Handlers -----------------
pub async fn get_user_profile(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> JsonResult<DataWrapper<ProfileWithBlogsResponse>> {
    let user = require_user(&state, id).await?;
    let blogs = list_blogs_by_author_in_db(&state.pool, id, Some(BlogStatus::Published))
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    Ok(Json(DataWrapper::wrap(ProfileWithBlogsResponse {
        user: ProfileResponse::new(user),
        blogs,
    })))
}

pub async fn update_profile(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> JsonResult<DataWrapper<UserResponse>> {
    let request = request.validate()?;
    let user = update_profile_in_db(&state.pool, user.id, request).await?;
    Ok(Json(DataWrapper::with_message(
        "Profile updated successfully",
        UserResponse::new(user),
    )))
}

// ----------------- User Blog Handlers -----------------

/// The caller's own blogs in every status.
pub async fn get_my_blogs(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
) -> JsonResult<ListWrapper<BlogResponse>> {
    let blogs = list_blogs_by_author_in_db(&state.pool, user.id, None)
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(blogs)))
}

pub async fn get_liked_blogs(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
) -> JsonResult<ListWrapper<BlogResponse>> {
    let blogs = list_liked_blogs_in_db(&state.pool, user.id)
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(blogs)))
}

pub async fn get_user_published_blogs(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> JsonResult<ListWrapper<BlogResponse>> {
    require_user(&state, id).await?;
    let blogs = list_blogs_by_author_in_db(&state.pool, id, Some(BlogStatus::Published))
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(blogs)))
}
