use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::CommentRequest, errors::RequestError, models::Comment};

const COMMENT_QUERY: &str = r#"
            SELECT comments.id                                       AS "id",
                   comments.content                                  AS "content",
                   comments.blog_id                                  AS "blog_id",
                   comments.user_id                                  AS "user_id",
                   users.name                                        AS "user_name",
                   users.profile_picture                             AS "user_picture",
                   comments.parent_id                                AS "parent_id",
                   (SELECT Group_concat(comment_likes.user_id, char(31))
                    FROM   comment_likes
                    WHERE  comment_likes.comment_id = comments.id)   AS "like_list",
                   comments.created_at                               AS "created_at",
                   comments.updated_at                               AS "updated_at"
            FROM   comments
                   JOIN users
                     ON users.id = comments.user_id
"#;

pub async fn get_comment_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Comment>, RequestError> {
    let query = format!("{COMMENT_QUERY} WHERE comments.id = ?1");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Every comment on a blog, newest first. Replies reference their parent.
pub async fn list_comments_for_blog_in_db(
    pool: &SqlitePool,
    blog_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_QUERY} WHERE comments.blog_id = ?1 ORDER BY comments.created_at DESC, comments.id DESC"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(blog_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

/// Inserts a comment, checking that a reply's parent lives on the same blog.
pub async fn add_comment_in_db(
    pool: &SqlitePool,
    blog_id: i64,
    user_id: i64,
    CommentRequest { content, parent }: CommentRequest,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    if let Some(parent_id) = parent {
        let parent_blog = sqlx::query_as::<Sqlite, (i64,)>(
            "SELECT blog_id FROM comments WHERE id = ?1",
        )
        .bind(parent_id)
        .fetch_optional(&mut tx)
        .await?;
        match parent_blog {
            None => return Err(RequestError::NotFound("Parent comment not found")),
            Some((parent_blog,)) if parent_blog != blog_id => {
                return Err(RequestError::validation(
                    "Parent comment belongs to a different blog",
                ))
            }
            Some(_) => {}
        }
    }

    let (comment_id,) = sqlx::query_as::<Sqlite, (i64,)>(
        r#"
        INSERT INTO comments (content, blog_id, user_id, parent_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        RETURNING id
        "#,
    )
    .bind(&content)
    .bind(blog_id)
    .bind(user_id)
    .bind(parent)
    .bind(now)
    .fetch_one(&mut tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO analytics (blog_id, comments, created_at, updated_at)
        VALUES (?1, 1, ?2, ?2)
        ON CONFLICT (blog_id) DO UPDATE
            SET comments = comments + 1, updated_at = excluded.updated_at
        "#,
    )
    .bind(blog_id)
    .bind(now)
    .execute(&mut tx)
    .await?;

    tx.commit().await?;

    match get_comment_in_db(pool, comment_id).await? {
        Some(comment) => Ok(comment),
        None => Err(RequestError::NotFound("Comment not found")),
    }
}

/// Flips the caller's like on a comment and returns the updated comment.
pub async fn toggle_comment_like_in_db(
    pool: &SqlitePool,
    comment_id: i64,
    user_id: i64,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;

    let removed =
        sqlx::query("DELETE FROM comment_likes WHERE comment_id = ?1 AND user_id = ?2")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut tx)
            .await?
            .rows_affected();
    if removed == 0 {
        sqlx::query("INSERT INTO comment_likes (comment_id, user_id) VALUES (?1, ?2)")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut tx)
            .await?;
    }
    tx.commit().await?;

    match get_comment_in_db(pool, comment_id).await? {
        Some(comment) => Ok(comment),
        None => Err(RequestError::NotFound("Comment not found")),
    }
}
