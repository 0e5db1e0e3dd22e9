use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Extension, Json,
};
use chrono::{Duration, Utc};

use super::{JsonBody, JsonResult};
use crate::{
    authentication::{
        clear_session_cookie, generate_reset_token, get_jwt_token, hash_password_argon2,
        session_cookie, verify_password_argon2, AuthUser,
    },
    data_formats::{
        validate_email, validate_password, AuthResponse, DataWrapper, ForgotPasswordRequest,
        LoginRequest, MessageWrapper, RegisterRequest, ResetPasswordRequest,
        UpdatePasswordRequest, UserResponse,
    },
    db_helpers::{
        get_user_by_email, get_user_by_id, get_user_by_reset_token, insert_user,
        set_reset_token_in_db, update_password_in_db,
    },
    errors::{is_unique_violation, RequestError},
    models::{Role, User},
    notifications::{notify, Notification},
    state::AppState,
    JsonResponse,
};

type AuthReply = (StatusCode, HeaderMap, Json<AuthResponse>);

fn cookie_headers(cookie: String) -> Result<HeaderMap, RequestError> {
    let value = HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!(error = %e, "session cookie is not a valid header value");
        RequestError::ServerError
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

/// Issues a session for `user`: token in the body and in the cookie.
fn session_reply(
    state: &AppState,
    status: StatusCode,
    message: &str,
    user: User,
) -> Result<AuthReply, RequestError> {
    let token = get_jwt_token(user.id, &state.config)?;
    let headers = cookie_headers(session_cookie(&token, &state.config))?;
    let body = AuthResponse {
        success: true,
        message: message.to_string(),
        user: UserResponse::new(user),
        token,
    };
    Ok((status, headers, Json(body)))
}

// ----------------- Auth Handlers -----------------
pub async fn register_user(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<AuthReply, RequestError> {
    let RegisterRequest {
        name,
        email,
        password,
    } = request.validate()?;

    if get_user_by_email(&state.pool, &email).await?.is_some() {
        return Err(RequestError::validation(
            "User already exists with this email",
        ));
    }

    let hash = hash_password_argon2(password).await?;
    let user_id = insert_user(&state.pool, &name, &email, &hash, Role::User)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return RequestError::validation("User already exists with this email");
            }
            e
        })?;
    let user = match get_user_by_id(&state.pool, user_id).await? {
        Some(user) => user,
        None => return Err(RequestError::ServerError),
    };
    tracing::info!(user_id, "user registered");

    notify(&*state.notifier, Notification::welcome(&user.email, &user.name)).await;

    session_reply(&state, StatusCode::CREATED, "User registered successfully", user)
}

pub async fn login_user(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<AuthReply, RequestError> {
    let LoginRequest { email, password } = request.validate()?;

    let user = match get_user_by_email(&state.pool, &email).await? {
        Some(user) => user,
        None => return Err(RequestError::NotAuthorized("Invalid credentials")),
    };
    if !verify_password_argon2(password, user.password.clone()).await? {
        tracing::debug!(user_id = user.id, "wrong password");
        return Err(RequestError::NotAuthorized("Invalid credentials"));
    }

    session_reply(&state, StatusCode::OK, "Login successful", user)
}

pub async fn logout_user(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
) -> Result<(HeaderMap, Json<MessageWrapper>), RequestError> {
    tracing::debug!(user_id = user.id, "logout");
    let headers = cookie_headers(clear_session_cookie(&state.config))?;
    Ok((headers, Json(MessageWrapper::new("Logged out successfully"))))
}

pub async fn get_current_user(
    AuthUser { user, .. }: AuthUser,
) -> JsonResult<DataWrapper<UserResponse>> {
    Ok(Json(DataWrapper::wrap(UserResponse::new(user))))
}

pub async fn update_password(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    JsonBody(request): JsonBody<UpdatePasswordRequest>,
) -> Result<AuthReply, RequestError> {
    if request.current_password.is_empty() {
        return Err(RequestError::validation(
            "Please provide your current password",
        ));
    }
    let new_password = validate_password(request.new_password)?;
    if !verify_password_argon2(request.current_password, user.password.clone()).await? {
        return Err(RequestError::NotAuthorized("Password is incorrect"));
    }

    let hash = hash_password_argon2(new_password).await?;
    update_password_in_db(&state.pool, user.id, &hash).await?;
    tracing::info!(user_id = user.id, "password updated");

    session_reply(&state, StatusCode::OK, "Password updated successfully", user)
}

/// Stores a fresh reset token and sends the link. Here the notification is
/// the whole point, so a delivery failure clears the token and fails the call.
pub async fn forgot_password(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(ForgotPasswordRequest { email }): JsonBody<ForgotPasswordRequest>,
) -> Result<JsonResponse<MessageWrapper>, RequestError> {
    let email = validate_email(&email)?;
    let user = match get_user_by_email(&state.pool, &email).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };

    let token = generate_reset_token();
    let minutes = state.config.reset_token_minutes;
    let expires_at = (Utc::now() + Duration::minutes(minutes)).timestamp();
    set_reset_token_in_db(&state.pool, user.id, Some(&token), Some(expires_at)).await?;

    let notification = Notification::password_reset(
        &user.email,
        &user.name,
        &state.config.reset_url(&token),
        minutes,
    );
    if let Err(error) = state.notifier.send(notification).await {
        tracing::error!(user_id = user.id, error = ?error, "failed to send reset email");
        set_reset_token_in_db(&state.pool, user.id, None, None).await?;
        return Err(RequestError::ServerError);
    }

    Ok((
        StatusCode::OK,
        Json(MessageWrapper::new("Password reset email sent")),
    ))
}

pub async fn reset_password(
    Extension(state): Extension<Arc<AppState>>,
    Path(token): Path<String>,
    JsonBody(ResetPasswordRequest { password }): JsonBody<ResetPasswordRequest>,
) -> JsonResult<MessageWrapper> {
    let password = validate_password(password)?;
    let now = Utc::now().timestamp();
    let user = match get_user_by_reset_token(&state.pool, &token, now).await? {
        Some(user) => user,
        None => return Err(RequestError::validation("Invalid token")),
    };

    let hash = hash_password_argon2(password).await?;
    update_password_in_db(&state.pool, user.id, &hash).await?;
    tracing::info!(user_id = user.id, "password reset");

    Ok(Json(MessageWrapper::new("Password reset successful")))
}
