use std::collections::HashMap;

use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{AuthorCount, BlogStatus},
};

/// Site-wide totals for the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct SiteCounts {
    pub total_users: i64,
    pub total_blogs: i64,
    pub by_status: HashMap<BlogStatus, i64>,
    pub total_views: i64,
}

impl SiteCounts {
    pub fn with_status(&self, status: BlogStatus) -> i64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

pub async fn site_counts_in_db(pool: &SqlitePool) -> Result<SiteCounts, RequestError> {
    let (total_users,) = sqlx::query_as::<Sqlite, (i64,)>("SELECT Count(*) FROM users")
        .fetch_one(pool)
        .await?;

    let (total_blogs, total_views) = sqlx::query_as::<Sqlite, (i64, i64)>(
        "SELECT Count(*), Coalesce(Sum(views), 0) FROM blogs",
    )
    .fetch_one(pool)
    .await?;

    let by_status = sqlx::query_as::<Sqlite, (BlogStatus, i64)>(
        "SELECT status, Count(*) FROM blogs GROUP BY status",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

    Ok(SiteCounts {
        total_users,
        total_blogs,
        by_status,
        total_views,
    })
}

/// Authors ranked by number of published blogs.
pub async fn top_authors_in_db(
    pool: &SqlitePool,
    limit: u32,
) -> Result<Vec<AuthorCount>, RequestError> {
    let result = sqlx::query_as::<Sqlite, AuthorCount>(
        r#"
            SELECT users.id      AS "author_id",
                   users.name    AS "name",
                   users.email   AS "email",
                   Count(*)      AS "count"
            FROM   blogs
                   JOIN users
                     ON users.id = blogs.author_id
            WHERE  blogs.status = ?1
            GROUP  BY users.id
            ORDER  BY "count" DESC, users.id
            LIMIT  ?2
        "#,
    )
    .bind(BlogStatus::Published)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    Ok(result)
}
