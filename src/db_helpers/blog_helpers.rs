use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::{BlogQueryParams, CreateBlogRequest, UpdateBlogRequest};
use crate::errors::RequestError;
use crate::models::{Blog, BlogStatus};
use crate::moderation::{read_time, UpdatePlan};

use super::QueryBuilder;

pub const DEFAULT_COVER_IMAGE: &str = "default-cover.jpg";

const BLOG_QUERY: &str = r#"
            SELECT blogs.id                                         AS "id",
                   blogs.title                                      AS "title",
                   blogs.content                                    AS "content",
                   blogs.excerpt                                    AS "excerpt",
                   blogs.cover_image                                AS "cover_image",
                   blogs.author_id                                  AS "author_id",
                   users.name                                       AS "author_name",
                   users.profile_picture                            AS "author_picture",
                   blogs.status                                     AS "status",
                   blogs.views                                      AS "views",
                   blogs.read_time                                  AS "read_time",
                   blogs.rejection_reason                           AS "rejection_reason",
                   (SELECT Group_concat(blog_tags.name, char(31))
                    FROM   blog_tags
                    WHERE  blog_tags.blog_id = blogs.id)            AS "tag_list",
                   (SELECT Group_concat(blog_likes.user_id, char(31))
                    FROM   blog_likes
                    WHERE  blog_likes.blog_id = blogs.id)           AS "like_list",
                   (SELECT Count(*)
                    FROM   blog_likes
                    WHERE  blog_likes.blog_id = blogs.id)           AS "likes_count",
                   blogs.created_at                                 AS "created_at",
                   blogs.updated_at                                 AS "updated_at"
            FROM   blogs
                   JOIN users
                     ON users.id = blogs.author_id
"#;

/// Shared by the public list and its count. `?1` status, `?2` search
/// pattern, `?3` tag, `?4` author id; a NULL filter matches everything.
/// The search pattern escapes wildcards with a backslash.
const PUBLIC_FILTER: &str = r#"
            WHERE  blogs.status = ?1
                   AND ( ?2 IS NULL
                          OR blogs.title LIKE ?2 ESCAPE '\'
                          OR blogs.content LIKE ?2 ESCAPE '\'
                          OR EXISTS (SELECT 1
                                     FROM   blog_tags
                                     WHERE  blog_tags.blog_id = blogs.id
                                            AND blog_tags.name LIKE ?2 ESCAPE '\') )
                   AND ( ?3 IS NULL
                          OR EXISTS (SELECT 1
                                     FROM   blog_tags
                                     WHERE  blog_tags.blog_id = blogs.id
                                            AND blog_tags.name = ?3) )
                   AND ( ?4 IS NULL
                          OR blogs.author_id = ?4 )
"#;

const NEWEST_FIRST: &str = " ORDER BY blogs.created_at DESC, blogs.id DESC ";

fn search_pattern(search: Option<&str>) -> Option<String> {
    search.map(|term| {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

pub async fn get_blog_by_id_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Blog>, RequestError> {
    let query = format!("{BLOG_QUERY} WHERE blogs.id = ?1");
    let result = sqlx::query_as::<Sqlite, Blog>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn require_blog(pool: &SqlitePool, id: i64) -> Result<Blog, RequestError> {
    match get_blog_by_id_in_db(pool, id).await? {
        Some(blog) => Ok(blog),
        None => Err(RequestError::NotFound("Blog not found")),
    }
}

/// Published blogs matching the filters, newest first, with the total count.
pub async fn list_published_blogs_in_db(
    pool: &SqlitePool,
    params: &BlogQueryParams,
) -> Result<(Vec<Blog>, i64), RequestError> {
    let pattern = search_pattern(params.search.as_deref());

    let query = format!("{BLOG_QUERY} {PUBLIC_FILTER} {NEWEST_FIRST} LIMIT ?5 OFFSET ?6");
    let blogs = sqlx::query_as::<Sqlite, Blog>(&query)
        .bind(BlogStatus::Published)
        .bind(pattern.as_deref())
        .bind(params.tag.as_deref())
        .bind(params.author)
        .bind(i64::from(params.limit))
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    let count_query = format!("SELECT Count(*) FROM blogs {PUBLIC_FILTER}");
    let (total,) = sqlx::query_as::<Sqlite, (i64,)>(&count_query)
        .bind(BlogStatus::Published)
        .bind(pattern.as_deref())
        .bind(params.tag.as_deref())
        .bind(params.author)
        .fetch_one(pool)
        .await?;

    Ok((blogs, total))
}

/// Published blogs created since `since`, most liked then most viewed first.
pub async fn list_trending_blogs_in_db(
    pool: &SqlitePool,
    since: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<Blog>, RequestError> {
    let query = format!(
        r#"{BLOG_QUERY}
            WHERE  blogs.status = ?1
                   AND blogs.created_at >= ?2
            ORDER  BY "likes_count" DESC, blogs.views DESC, blogs.created_at DESC
            LIMIT  ?3"#
    );
    let result = sqlx::query_as::<Sqlite, Blog>(&query)
        .bind(BlogStatus::Published)
        .bind(since)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn list_blogs_by_author_in_db(
    pool: &SqlitePool,
    author_id: i64,
    status: Option<BlogStatus>,
) -> Result<Vec<Blog>, RequestError> {
    let query = format!(
        "{BLOG_QUERY} WHERE blogs.author_id = ?1 AND (?2 IS NULL OR blogs.status = ?2) {NEWEST_FIRST}"
    );
    let result = sqlx::query_as::<Sqlite, Blog>(&query)
        .bind(author_id)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn list_liked_blogs_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Blog>, RequestError> {
    let query = format!(
        r#"{BLOG_QUERY}
            WHERE  blogs.status = ?1
                   AND EXISTS (SELECT 1
                               FROM   blog_likes
                               WHERE  blog_likes.blog_id = blogs.id
                                      AND blog_likes.user_id = ?2)
            {NEWEST_FIRST}"#
    );
    let result = sqlx::query_as::<Sqlite, Blog>(&query)
        .bind(BlogStatus::Published)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

/// Every blog regardless of status, optionally narrowed to one status.
pub async fn list_all_blogs_in_db(
    pool: &SqlitePool,
    status: Option<BlogStatus>,
    limit: Option<u32>,
) -> Result<Vec<Blog>, RequestError> {
    let query = format!("{BLOG_QUERY} WHERE (?1 IS NULL OR blogs.status = ?1) {NEWEST_FIRST} LIMIT ?2");
    let limit = limit.map(i64::from).unwrap_or(-1);
    let result = sqlx::query_as::<Sqlite, Blog>(&query)
        .bind(status)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

async fn replace_tags(
    tx: &mut Transaction<'_, Sqlite>,
    blog_id: i64,
    tags: &[String],
) -> Result<(), RequestError> {
    sqlx::query("DELETE FROM blog_tags WHERE blog_id = ?1")
        .bind(blog_id)
        .execute(&mut *tx)
        .await?;
    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO blog_tags (blog_id, name) VALUES (?1, ?2)")
            .bind(blog_id)
            .bind(tag)
            .execute(&mut *tx)
            .await?;
    }
    Ok(())
}

/// Inserts a pending blog with its tags and an empty analytics record.
pub async fn create_blog_in_db(
    pool: &SqlitePool,
    author_id: i64,
    CreateBlogRequest {
        title,
        content,
        excerpt,
        cover_image,
        tags,
    }: CreateBlogRequest,
) -> Result<Blog, RequestError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let minutes = read_time(&content);
    let cover_image = cover_image.unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string());

    let (blog_id,) = sqlx::query_as::<Sqlite, (i64,)>(
        r#"
        INSERT INTO blogs (title, content, excerpt, cover_image, author_id, status, read_time, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        RETURNING id
        "#,
    )
    .bind(&title)
    .bind(&content)
    .bind(&excerpt)
    .bind(&cover_image)
    .bind(author_id)
    .bind(BlogStatus::Pending)
    .bind(minutes)
    .bind(now)
    .fetch_one(&mut tx)
    .await?;

    replace_tags(&mut tx, blog_id, &tags).await?;

    sqlx::query(
        r#"
        INSERT INTO analytics (blog_id, created_at, updated_at)
        VALUES (?1, ?2, ?2)
        "#,
    )
    .bind(blog_id)
    .bind(now)
    .execute(&mut tx)
    .await?;

    tx.commit().await?;
    require_blog(pool, blog_id).await
}

/// Writes the validated fields plus whatever the moderation plan decided.
pub async fn update_blog_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateBlogRequest {
        title,
        content,
        excerpt,
        cover_image,
        tags,
        ..
    }: UpdateBlogRequest,
    plan: UpdatePlan,
) -> Result<Blog, RequestError> {
    let mut tx = pool.begin().await?;
    let minutes = content.as_deref().map(|content| read_time(content).to_string());

    if let Some((assignments, params)) = QueryBuilder::new(", ")
        .add_param("title", title)
        .add_param("content", content)
        .add_param("read_time", minutes)
        .add_param("excerpt", excerpt)
        .add_param("cover_image", cover_image)
        .add_param("status", plan.status.map(|status| status.to_string()))
        .add_param("rejection_reason", plan.rejection_reason)
        .build()
    {
        let query = format!("UPDATE blogs SET {assignments}, updated_at = ? WHERE id = ?");
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        let result = query.bind(Utc::now()).bind(id).execute(&mut tx).await?;
        if result.rows_affected() == 0 {
            return Err(RequestError::NotFound("Blog not found"));
        }
    }

    if plan.clear_rejection_reason {
        sqlx::query("UPDATE blogs SET rejection_reason = NULL WHERE id = ?1")
            .bind(id)
            .execute(&mut tx)
            .await?;
    }

    if let Some(tags) = tags {
        replace_tags(&mut tx, id, &tags).await?;
    }

    tx.commit().await?;
    require_blog(pool, id).await
}

/// Moves a blog to `status`. Any earlier rejection reason is replaced by `rejection_reason`.
pub async fn set_blog_status_in_db(
    pool: &SqlitePool,
    id: i64,
    status: BlogStatus,
    rejection_reason: Option<&str>,
) -> Result<Blog, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE blogs
        SET status = ?1, rejection_reason = ?2, updated_at = ?3
        WHERE id = ?4
        "#,
    )
    .bind(status)
    .bind(rejection_reason)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Blog not found"));
    }
    tx.commit().await?;
    require_blog(pool, id).await
}

/// Removes a blog and everything hanging off it.
pub async fn delete_blog_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let dependents = [
        "DELETE FROM comment_likes WHERE comment_id IN (SELECT id FROM comments WHERE blog_id = ?1)",
        "DELETE FROM comments WHERE blog_id = ?1",
        "DELETE FROM blog_likes WHERE blog_id = ?1",
        "DELETE FROM blog_tags WHERE blog_id = ?1",
        "DELETE FROM views WHERE blog_id = ?1",
        "DELETE FROM analytics_views_history WHERE blog_id = ?1",
        "DELETE FROM analytics WHERE blog_id = ?1",
    ];
    for statement in dependents {
        sqlx::query(statement).bind(id).execute(&mut tx).await?;
    }

    let result = sqlx::query("DELETE FROM blogs WHERE id = ?1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Blog not found"));
    }

    tx.commit().await?;
    Ok(())
}

/// Flips the caller's like and returns whether the blog is now liked.
pub async fn toggle_blog_like_in_db(
    pool: &SqlitePool,
    blog_id: i64,
    user_id: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    let removed = sqlx::query("DELETE FROM blog_likes WHERE blog_id = ?1 AND user_id = ?2")
        .bind(blog_id)
        .bind(user_id)
        .execute(&mut tx)
        .await?
        .rows_affected();

    if removed == 0 {
        sqlx::query("INSERT INTO blog_likes (blog_id, user_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(blog_id)
            .bind(user_id)
            .bind(now)
            .execute(&mut tx)
            .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO analytics (blog_id, likes, created_at, updated_at)
        VALUES (?1, (SELECT Count(*) FROM blog_likes WHERE blog_id = ?1), ?2, ?2)
        ON CONFLICT (blog_id) DO UPDATE
            SET likes = excluded.likes, updated_at = excluded.updated_at
        "#,
    )
    .bind(blog_id)
    .bind(now)
    .execute(&mut tx)
    .await?;

    tx.commit().await?;
    Ok(removed == 0)
}
