use std::{net::SocketAddr, sync::Arc};

use crate::{config::Config, db_helpers::get_user_by_id, errors::RequestError, models::User};
use crate::state::AppState;
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{header, request::Parts, HeaderMap};
use rand::distributions::{Alphanumeric, DistString};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const TOKEN_COOKIE: &str = "token";
const RESET_TOKEN_LENGTH: usize = 40;

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    exp: i64,
}

/// A request carrying a valid session for an existing user.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// Like [`AuthUser`], but absent or stale credentials yield `None`.
pub struct MaybeUser(pub Option<AuthUser>);

/// An [`AuthUser`] whose role is `admin`.
pub struct AdminUser(pub AuthUser);

/// Identity of the caller for view counting: first `X-Forwarded-For` hop,
/// else the peer address.
pub struct ClientIp(pub String);

impl MaybeUser {
    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|a| a.user.id)
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref().map(|a| &a.user)
    }
}

fn app_state(parts: &Parts) -> Result<Arc<AppState>, RequestError> {
    parts
        .extensions
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("AppState extension missing from request");
            RequestError::ServerError
        })
}

/// Pulls the session token from `Authorization: Bearer` or the `token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty() && *value != "none")
        .map(|(_, value)| value.to_string())
}

async fn authenticate(parts: &Parts) -> Result<Option<AuthUser>, RequestError> {
    let token = match extract_token(&parts.headers) {
        Some(token) => token,
        None => return Ok(None),
    };
    let state = app_state(parts)?;
    let id = verify_jwt_token(&token, &state.config.jwt_secret)?;
    match get_user_by_id(&state.pool, id).await? {
        Some(user) => Ok(Some(AuthUser { user, token })),
        None => Err(RequestError::NotAuthorized("User no longer exists")),
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match authenticate(parts).await? {
            Some(user) => Ok(user),
            None => Err(RequestError::NotAuthorized(
                "Not authorized to access this route",
            )),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match authenticate(parts).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(RequestError::NotAuthorized(reason)) => {
                tracing::debug!(reason, "ignoring stale credentials on public route");
                Ok(MaybeUser(None))
            }
            Err(e) => Err(e),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.user.is_admin() {
            tracing::warn!(user_id = auth.user.id, "non-admin attempted admin route");
            return Err(RequestError::Forbidden(
                "Only administrators may access this route",
            ));
        }
        Ok(AdminUser(auth))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return Ok(ClientIp(ip));
        }
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientIp(peer))
    }
}

pub fn get_jwt_token(id: i64, config: &Config) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + time::Duration::days(config.jwt_expire_days);
    let claim = AuthClaim {
        id,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(token: &str, secret: &str) -> Result<i64, RequestError> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        RequestError::NotAuthorized("Invalid token")
    })?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok(claim.id)
}

/// `Set-Cookie` value carrying a fresh session.
pub fn session_cookie(token: &str, config: &Config) -> String {
    let max_age = config.jwt_expire_days * 24 * 60 * 60;
    let mut cookie = format!(
        "{TOKEN_COOKIE}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Strict"
    );
    if config.production {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that clears the session.
pub fn clear_session_cookie(config: &Config) -> String {
    let mut cookie = format!("{TOKEN_COOKIE}=none; Path=/; Max-Age=0; HttpOnly; SameSite=Strict");
    if config.production {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn generate_reset_token() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), RESET_TOKEN_LENGTH)
}

pub async fn verify_password_argon2(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to parse password hash"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_round_trips_and_rejects_wrong_secret() {
        let config = Config::new("sqlite::memory:", "first-secret");
        let token = get_jwt_token(42, &config).unwrap();
        assert_eq!(verify_jwt_token(&token, "first-secret").unwrap(), 42);
        assert!(matches!(
            verify_jwt_token(&token, "other-secret"),
            Err(RequestError::NotAuthorized(_))
        ));
        assert!(verify_jwt_token("not.a.jwt", "first-secret").is_err());
    }

    #[test]
    fn extract_token_prefers_bearer_then_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=from-cookie"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn cleared_cookie_is_not_a_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=none"));
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn cookies_are_http_only_and_secure_in_production() {
        let mut config = Config::new("sqlite::memory:", "secret");
        let cookie = session_cookie("abc", &config);
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));

        config.production = true;
        assert!(session_cookie("abc", &config).ends_with("; Secure"));
        assert!(clear_session_cookie(&config).contains("Max-Age=0"));
    }

    #[test]
    fn reset_tokens_are_random_alphanumerics() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), RESET_TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn password_hash_verifies_only_original() {
        let hash = hash_password_argon2("hunter22".to_string()).await.unwrap();
        assert!(verify_password_argon2("hunter22".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_argon2("hunter23".to_string(), hash)
            .await
            .unwrap());
    }
}
