use std::{str::FromStr, sync::Arc};

use axum::{extract::Path, Extension, Json};

use super::{JsonBody, JsonResult, QueryParams};
use crate::{
    authentication::AdminUser,
    data_formats::{
        AdminBlogQueryParams, BlogResponse, DataWrapper, ListWrapper, MessageWrapper,
        RejectRequest, RoleRequest, StatsResponse, TopAuthorResponse, UserResponse,
    },
    db_helpers::{
        delete_blog_in_db, get_user_by_id, list_all_blogs_in_db, list_users_in_db, require_blog,
        set_blog_status_in_db, site_counts_in_db, top_authors_in_db, update_role_in_db,
    },
    errors::RequestError,
    models::{Blog, BlogStatus, Role},
    moderation::{transition, ModerationAction, DEFAULT_REJECTION_REASON},
    notifications::{notify, Notification},
    state::AppState,
};

const DASHBOARD_LIST_SIZE: u32 = 5;

/// Runs a moderation action and returns the updated blog.
async fn moderate(
    state: &AppState,
    admin_id: i64,
    id: i64,
    action: ModerationAction,
    reason: Option<&str>,
) -> Result<Blog, RequestError> {
    let blog = require_blog(&state.pool, id).await?;
    let status = transition(blog.status, action)?;
    let blog = set_blog_status_in_db(&state.pool, id, status, reason).await?;
    tracing::info!(blog_id = id, admin_id, action = action.verb(), "blog moderated");
    Ok(blog)
}

/// Tells the author what happened, if the author can still be found.
async fn notify_author(
    state: &AppState,
    blog: &Blog,
    build: impl FnOnce(&str, &str) -> Notification,
) {
    match get_user_by_id(&state.pool, blog.author_id).await {
        Ok(Some(author)) => notify(&*state.notifier, build(&author.email, &author.name)).await,
        Ok(None) => tracing::warn!(blog_id = blog.id, "blog author missing"),
        Err(error) => tracing::warn!(blog_id = blog.id, %error, "could not load blog author"),
    }
}

// ----------------- Dashboard -----------------
pub async fn get_admin_stats(
    Extension(state): Extension<Arc<AppState>>,
    _: AdminUser,
) -> JsonResult<DataWrapper<StatsResponse>> {
    let counts = site_counts_in_db(&state.pool).await?;
    let recent_blogs = list_all_blogs_in_db(&state.pool, None, Some(DASHBOARD_LIST_SIZE))
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    let recent_users = list_users_in_db(&state.pool, Some(DASHBOARD_LIST_SIZE))
        .await?
        .into_iter()
        .map(UserResponse::new)
        .collect();
    let top_authors = top_authors_in_db(&state.pool, DASHBOARD_LIST_SIZE)
        .await?
        .into_iter()
        .map(TopAuthorResponse::new)
        .collect();

    Ok(Json(DataWrapper::wrap(StatsResponse {
        total_users: counts.total_users,
        total_blogs: counts.total_blogs,
        pending_blogs: counts.with_status(BlogStatus::Pending),
        published_blogs: counts.with_status(BlogStatus::Published),
        rejected_blogs: counts.with_status(BlogStatus::Rejected),
        hidden_blogs: counts.with_status(BlogStatus::Hidden),
        recent_blogs,
        recent_users,
        top_authors,
        total_views: counts.total_views,
    })))
}

// ----------------- Blog Moderation -----------------
pub async fn get_all_blogs(
    Extension(state): Extension<Arc<AppState>>,
    _: AdminUser,
    QueryParams(AdminBlogQueryParams { status }): QueryParams<AdminBlogQueryParams>,
) -> JsonResult<ListWrapper<BlogResponse>> {
    let status = status
        .as_deref()
        .filter(|status| !status.trim().is_empty())
        .map(BlogStatus::from_str)
        .transpose()
        .map_err(RequestError::ValidationError)?;
    let blogs = list_all_blogs_in_db(&state.pool, status, None)
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(blogs)))
}

pub async fn get_pending_blogs(
    Extension(state): Extension<Arc<AppState>>,
    _: AdminUser,
) -> JsonResult<ListWrapper<BlogResponse>> {
    let blogs = list_all_blogs_in_db(&state.pool, Some(BlogStatus::Pending), None)
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(blogs)))
}

pub async fn approve_blog(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> JsonResult<DataWrapper<BlogResponse>> {
    let blog = moderate(&state, admin.user.id, id, ModerationAction::Approve, None).await?;
    let blog_url = state.config.blog_url(blog.id);
    notify_author(&state, &blog, |email, name| {
        Notification::blog_approved(email, name, &blog.title, &blog_url)
    })
    .await;

    Ok(Json(DataWrapper::with_message(
        "Blog approved successfully",
        BlogResponse::new(blog),
    )))
}

pub async fn reject_blog(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    body: Option<JsonBody<RejectRequest>>,
) -> JsonResult<DataWrapper<BlogResponse>> {
    let reason = body
        .and_then(|JsonBody(RejectRequest { reason })| reason)
        .map(|reason| reason.trim().to_string())
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
    let blog = moderate(
        &state,
        admin.user.id,
        id,
        ModerationAction::Reject,
        Some(&reason),
    )
    .await?;
    notify_author(&state, &blog, |email, name| {
        Notification::blog_rejected(email, name, &blog.title, &reason)
    })
    .await;

    Ok(Json(DataWrapper::with_message(
        "Blog rejected successfully",
        BlogResponse::new(blog),
    )))
}

pub async fn hide_blog(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> JsonResult<DataWrapper<BlogResponse>> {
    let blog = moderate(&state, admin.user.id, id, ModerationAction::Hide, None).await?;
    Ok(Json(DataWrapper::with_message(
        "Blog hidden successfully",
        BlogResponse::new(blog),
    )))
}

pub async fn admin_delete_blog(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> JsonResult<MessageWrapper> {
    let blog = require_blog(&state.pool, id).await?;
    delete_blog_in_db(&state.pool, id).await?;
    tracing::info!(blog_id = id, admin_id = admin.user.id, "blog deleted by admin");

    notify_author(&state, &blog, |email, name| {
        Notification::blog_deleted(email, name, &blog.title)
    })
    .await;

    Ok(Json(MessageWrapper::new("Blog deleted successfully")))
}

// ----------------- User Management -----------------
pub async fn get_users(
    Extension(state): Extension<Arc<AppState>>,
    _: AdminUser,
) -> JsonResult<ListWrapper<UserResponse>> {
    let users = list_users_in_db(&state.pool, None)
        .await?
        .into_iter()
        .map(UserResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(users)))
}

pub async fn update_user_role(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    JsonBody(RoleRequest { role }): JsonBody<RoleRequest>,
) -> JsonResult<DataWrapper<UserResponse>> {
    let role = Role::from_str(&role).map_err(RequestError::ValidationError)?;
    let user = update_role_in_db(&state.pool, id, role).await?;
    tracing::info!(user_id = id, admin_id = admin.user.id, %role, "role changed");
    Ok(Json(DataWrapper::with_message(
        "User role updated successfully",
        UserResponse::new(user),
    )))
}
