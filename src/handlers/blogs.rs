use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::{Duration, Utc};

use super::{JsonBody, JsonResult, QueryParams};
use crate::{
    authentication::{AuthUser, ClientIp, MaybeUser},
    data_formats::{
        AnalyticsResponse, BlogDetailResponse, BlogQueryParams, BlogResponse, CommentRequest,
        CommentResponse, CreateBlogRequest, DataWrapper, ListWrapper, MessageWrapper,
        PagedListWrapper, TrendingQueryParams, UpdateBlogRequest, MAX_PAGE_LIMIT,
    },
    db_helpers::{
        add_comment_in_db, create_blog_in_db, delete_blog_in_db, get_analytics_in_db,
        get_comment_in_db, get_user_by_id, list_comments_for_blog_in_db,
        list_published_blogs_in_db, list_trending_blogs_in_db, record_view_in_db, require_blog,
        toggle_blog_like_in_db, toggle_comment_like_in_db, update_blog_in_db, ViewerIdentity,
    },
    errors::RequestError,
    models::{Blog, User},
    moderation::{is_publicly_visible, plan_update},
    notifications::{notify, Notification},
    state::AppState,
    JsonResponse,
};

const TRENDING_WINDOW_DAYS: i64 = 7;

fn can_manage(user: &User, blog: &Blog) -> bool {
    user.is_admin() || user.id == blog.author_id
}

/// Published blogs are public; anything else only reaches its author and admins.
fn ensure_readable(viewer: Option<&User>, blog: &Blog) -> Result<(), RequestError> {
    if is_publicly_visible(blog.status) {
        return Ok(());
    }
    match viewer {
        Some(user) if can_manage(user, blog) => Ok(()),
        _ => Err(RequestError::Forbidden("Not authorized to access this blog")),
    }
}

// ----------------- Blog Handlers -----------------
pub async fn list_blogs(
    Extension(state): Extension<Arc<AppState>>,
    QueryParams(params): QueryParams<BlogQueryParams>,
) -> JsonResult<PagedListWrapper<BlogResponse>> {
    let params = params.normalized();
    let (blogs, total) = list_published_blogs_in_db(&state.pool, &params).await?;
    let blogs = blogs.into_iter().map(BlogResponse::new).collect();
    Ok(Json(PagedListWrapper::wrap(
        blogs,
        total,
        params.page,
        params.limit,
    )))
}

pub async fn list_trending_blogs(
    Extension(state): Extension<Arc<AppState>>,
    QueryParams(TrendingQueryParams { limit }): QueryParams<TrendingQueryParams>,
) -> JsonResult<ListWrapper<BlogResponse>> {
    let since = Utc::now() - Duration::days(TRENDING_WINDOW_DAYS);
    let blogs = list_trending_blogs_in_db(&state.pool, since, limit.clamp(1, MAX_PAGE_LIMIT))
        .await?
        .into_iter()
        .map(BlogResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(blogs)))
}

/// Returns the blog with its comments and counts the read once per window.
pub async fn get_blog(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> JsonResult<DataWrapper<BlogDetailResponse>> {
    let mut blog = require_blog(&state.pool, id).await?;
    ensure_readable(maybe_user.user(), &blog)?;

    let identity = ViewerIdentity::new(maybe_user.get_id(), &ip);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());
    match record_view_in_db(
        &state.pool,
        blog.id,
        &identity,
        &ip,
        user_agent,
        state.config.view_window_hours,
    )
    .await
    {
        Ok(true) => blog.views += 1,
        Ok(false) => tracing::trace!(blog_id = blog.id, "repeat view"),
        Err(error) => tracing::warn!(blog_id = blog.id, %error, "failed to track view"),
    }

    let comments = list_comments_for_blog_in_db(&state.pool, blog.id)
        .await?
        .into_iter()
        .map(CommentResponse::new)
        .collect();
    Ok(Json(DataWrapper::wrap(BlogDetailResponse {
        blog: BlogResponse::new(blog),
        comments,
    })))
}

pub async fn create_blog(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    JsonBody(request): JsonBody<CreateBlogRequest>,
) -> Result<JsonResponse<DataWrapper<BlogResponse>>, RequestError> {
    let request = request.validate()?;
    let blog = create_blog_in_db(&state.pool, user.id, request).await?;
    tracing::info!(blog_id = blog.id, author_id = user.id, "blog submitted");

    notify(
        &*state.notifier,
        Notification::blog_submitted(&user.email, &user.name, &blog.title),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(DataWrapper::with_message(
            "Blog created successfully and pending approval",
            BlogResponse::new(blog),
        )),
    ))
}

pub async fn update_blog(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(id): Path<i64>,
    JsonBody(request): JsonBody<UpdateBlogRequest>,
) -> JsonResult<DataWrapper<BlogResponse>> {
    let blog = require_blog(&state.pool, id).await?;
    if !can_manage(&user, &blog) {
        return Err(RequestError::Forbidden("Not authorized to update this blog"));
    }

    let request = request.validate()?;
    if request.is_empty() {
        return Err(RequestError::validation("No fields to update"));
    }
    let plan = plan_update(blog.status, user.is_admin(), &request)?;
    if let Some(status) = plan.status {
        tracing::info!(blog_id = id, from = %blog.status, to = %status, "blog status changed by update");
    }
    let blog = update_blog_in_db(&state.pool, id, request, plan).await?;

    Ok(Json(DataWrapper::with_message(
        "Blog updated successfully",
        BlogResponse::new(blog),
    )))
}

pub async fn delete_blog(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<MessageWrapper> {
    let blog = require_blog(&state.pool, id).await?;
    if !can_manage(&user, &blog) {
        return Err(RequestError::Forbidden("Not authorized to delete this blog"));
    }
    delete_blog_in_db(&state.pool, id).await?;
    tracing::info!(blog_id = id, user_id = user.id, "blog deleted");
    Ok(Json(MessageWrapper::new("Blog deleted successfully")))
}

pub async fn like_blog(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<DataWrapper<BlogResponse>> {
    let blog = require_blog(&state.pool, id).await?;
    ensure_readable(Some(&user), &blog)?;

    let liked = toggle_blog_like_in_db(&state.pool, id, user.id).await?;
    let blog = require_blog(&state.pool, id).await?;
    let message = if liked { "Blog liked" } else { "Blog unliked" };
    Ok(Json(DataWrapper::with_message(
        message,
        BlogResponse::new(blog),
    )))
}

pub async fn get_blog_analytics(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<DataWrapper<AnalyticsResponse>> {
    let blog = require_blog(&state.pool, id).await?;
    if !can_manage(&user, &blog) {
        return Err(RequestError::Forbidden(
            "Not authorized to view analytics for this blog",
        ));
    }
    let (analytics, history) = get_analytics_in_db(&state.pool, id).await?;
    Ok(Json(DataWrapper::wrap(AnalyticsResponse::new(
        analytics, history,
    ))))
}

// ----------------- Comment Handlers -----------------
pub async fn add_comment(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(id): Path<i64>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> Result<JsonResponse<DataWrapper<CommentResponse>>, RequestError> {
    let blog = require_blog(&state.pool, id).await?;
    ensure_readable(Some(&user), &blog)?;

    let request = request.validate()?;
    let comment = add_comment_in_db(&state.pool, id, user.id, request).await?;
    tracing::debug!(comment_id = comment.id, blog_id = id, "comment added");

    if blog.author_id != user.id {
        match get_user_by_id(&state.pool, blog.author_id).await {
            Ok(Some(author)) => {
                let notification = Notification::new_comment(
                    &author.email,
                    &author.name,
                    &blog.title,
                    &user.name,
                    &state.config.blog_url(blog.id),
                );
                notify(&*state.notifier, notification).await;
            }
            Ok(None) => tracing::warn!(blog_id = id, "blog author missing"),
            Err(error) => tracing::warn!(blog_id = id, %error, "could not load blog author"),
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(DataWrapper::with_message(
            "Comment added successfully",
            CommentResponse::new(comment),
        )),
    ))
}

pub async fn list_comments(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
) -> JsonResult<ListWrapper<CommentResponse>> {
    let blog = require_blog(&state.pool, id).await?;
    ensure_readable(maybe_user.user(), &blog)?;

    let comments = list_comments_for_blog_in_db(&state.pool, id)
        .await?
        .into_iter()
        .map(CommentResponse::new)
        .collect();
    Ok(Json(ListWrapper::wrap(comments)))
}

pub async fn like_comment(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<DataWrapper<CommentResponse>> {
    let comment = match get_comment_in_db(&state.pool, id).await? {
        Some(comment) => comment,
        None => return Err(RequestError::NotFound("Comment not found")),
    };
    let blog = require_blog(&state.pool, comment.blog_id).await?;
    ensure_readable(Some(&user), &blog)?;

    let comment = toggle_comment_like_in_db(&state.pool, id, user.id).await?;
    let message = if comment.likes().contains(&user.id) {
        "Comment liked"
    } else {
        "Comment unliked"
    };
    Ok(Json(DataWrapper::with_message(
        message,
        CommentResponse::new(comment),
    )))
}
