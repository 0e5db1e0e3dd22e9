mod authentication;
pub mod client;
pub mod config;
mod data_formats;
mod db_helpers;
pub mod errors;
mod handlers;
pub mod logging;
pub mod models;
pub mod moderation;
pub mod notifications;
pub mod state;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use data_formats::*;
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tower_http::trace::TraceLayer;

use crate::{config::AdminSeed, models::Role, state::AppState};

pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Serves `app` on an already bound listener until the process stops.
pub async fn run_app(app: Router, listener: TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    tracing::info!(%address, "server started");
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server stopped unexpectedly")?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!(db_url, "creating database");
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {db_url}"))?;
    } else {
        tracing::debug!(db_url, "database already exists");
    }
    let pool = SqlitePool::connect(db_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("migrations completed");
    Ok(pool)
}

/// Creates the configured administrator unless that email is already taken.
pub async fn seed_admin(pool: &SqlitePool, seed: &AdminSeed) -> Result<()> {
    let email = validate_email(&seed.email).context("Invalid ADMIN_EMAIL")?;
    if let Some(user) = db_helpers::get_user_by_email(pool, &email).await? {
        if !user.is_admin() {
            tracing::warn!(%email, "seed admin email belongs to a regular user; leaving it alone");
        }
        return Ok(());
    }

    let password = validate_password(seed.password.clone()).context("Invalid ADMIN_PASSWORD")?;
    let hash = authentication::hash_password_argon2(password).await?;
    let id = db_helpers::insert_user(pool, &seed.name, &email, &hash, Role::Admin).await?;
    tracing::info!(user_id = id, %email, "admin account created");
    Ok(())
}

pub fn make_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user))
        .route("/auth/logout", post(logout_user))
        .route("/auth/me", get(get_current_user))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/:token", put(reset_password))
        .route("/auth/update-password", put(update_password))
        .route("/blogs", get(list_blogs).post(create_blog))
        .route("/blogs/trending", get(list_trending_blogs))
        .route(
            "/blogs/:id",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
        .route("/blogs/:id/like", put(like_blog))
        .route("/blogs/:id/comments", get(list_comments).post(add_comment))
        .route("/blogs/:id/analytics", get(get_blog_analytics))
        .route("/comments/:id/like", put(like_comment))
        .route("/users/profile", put(update_profile))
        .route("/users/blogs/me", get(get_my_blogs))
        .route("/users/blogs/liked", get(get_liked_blogs))
        .route("/users/:id", get(get_user_profile))
        .route("/users/:id/blogs", get(get_user_published_blogs))
        .route("/admin/stats", get(get_admin_stats))
        .route("/admin/blogs", get(get_all_blogs))
        .route("/admin/blogs/pending", get(get_pending_blogs))
        .route("/admin/blogs/:id", delete(admin_delete_blog))
        .route("/admin/blogs/:id/approve", put(approve_blog))
        .route("/admin/blogs/:id/reject", put(reject_blog))
        .route("/admin/blogs/:id/hide", put(hide_blog))
        .route("/admin/users", get(get_users))
        .route("/admin/users/:id/role", put(update_user_role));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
