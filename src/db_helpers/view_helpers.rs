use chrono::{Duration, Utc};
use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Analytics, ViewHistoryEntry},
};

/// Who is reading: a signed-in user or, failing that, the client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerIdentity {
    User(i64),
    Ip(String),
}

impl ViewerIdentity {
    pub fn new(user_id: Option<i64>, ip: &str) -> Self {
        match user_id {
            Some(id) => ViewerIdentity::User(id),
            None => ViewerIdentity::Ip(ip.to_string()),
        }
    }

    pub fn key(&self) -> String {
        match self {
            ViewerIdentity::User(id) => format!("user:{}", id),
            ViewerIdentity::Ip(ip) => format!("ip:{}", ip),
        }
    }

    fn user_id(&self) -> Option<i64> {
        match self {
            ViewerIdentity::User(id) => Some(*id),
            ViewerIdentity::Ip(_) => None,
        }
    }
}

/// Counts a view unless this identity already has a live record for the blog.
/// Returns whether the view was counted.
pub async fn record_view_in_db(
    pool: &SqlitePool,
    blog_id: i64,
    identity: &ViewerIdentity,
    ip: &str,
    user_agent: Option<&str>,
    window_hours: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let key = identity.key();

    sqlx::query("DELETE FROM views WHERE blog_id = ?1 AND identity = ?2 AND expires_at <= ?3")
        .bind(blog_id)
        .bind(&key)
        .bind(now.timestamp())
        .execute(&mut tx)
        .await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO views (blog_id, identity, user_id, ip, user_agent, expires_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT (blog_id, identity) DO NOTHING
        "#,
    )
    .bind(blog_id)
    .bind(&key)
    .bind(identity.user_id())
    .bind(ip)
    .bind(user_agent)
    .bind((now + Duration::hours(window_hours)).timestamp())
    .bind(now)
    .execute(&mut tx)
    .await?
    .rows_affected();

    if inserted != 1 {
        tx.commit().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE blogs SET views = views + 1 WHERE id = ?1")
        .bind(blog_id)
        .execute(&mut tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO analytics (blog_id, views, created_at, updated_at)
        VALUES (?1, 1, ?2, ?2)
        ON CONFLICT (blog_id) DO UPDATE
            SET views = views + 1, updated_at = excluded.updated_at
        "#,
    )
    .bind(blog_id)
    .bind(now)
    .execute(&mut tx)
    .await?;

    sqlx::query("INSERT INTO analytics_views_history (blog_id, date, count) VALUES (?1, ?2, 1)")
        .bind(blog_id)
        .bind(now)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

pub async fn get_analytics_in_db(
    pool: &SqlitePool,
    blog_id: i64,
) -> Result<(Analytics, Vec<ViewHistoryEntry>), RequestError> {
    let analytics = sqlx::query_as::<Sqlite, Analytics>(
        r#"
        SELECT blog_id, views, likes, comments, shares, created_at, updated_at
        FROM analytics
        WHERE blog_id = ?1
        "#,
    )
    .bind(blog_id)
    .fetch_optional(pool)
    .await?;

    let analytics = match analytics {
        Some(analytics) => analytics,
        None => return Err(RequestError::NotFound("Analytics not found")),
    };

    let history = sqlx::query_as::<Sqlite, ViewHistoryEntry>(
        "SELECT date, count FROM analytics_views_history WHERE blog_id = ?1 ORDER BY date, id",
    )
    .bind(blog_id)
    .fetch_all(pool)
    .await?;

    Ok((analytics, history))
}
