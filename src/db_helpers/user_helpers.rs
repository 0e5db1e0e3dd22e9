use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    data_formats::UpdateProfileRequest,
    errors::RequestError,
    models::{Role, User},
};

use super::QueryBuilder;

const USER_COLUMNS: &str = r#"
    id, name, email, password, role, bio, profile_picture,
    reset_password_token, reset_password_expire, created_at, updated_at
"#;

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    let result = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
    let result = sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn insert_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let (id,) = sqlx::query_as::<_, (i64,)>(
        r#"
        INSERT INTO users (name, email, password, role, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

pub async fn update_profile_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateProfileRequest {
        name,
        bio,
        profile_picture,
    }: UpdateProfileRequest,
) -> Result<User, RequestError> {
    if let Some((assignments, params)) = QueryBuilder::new(", ")
        .add_param("name", name)
        .add_param("bio", bio)
        .add_param("profile_picture", profile_picture)
        .build()
    {
        let mut tx = pool.begin().await?;
        let query = format!("UPDATE users SET {assignments}, updated_at = ? WHERE id = ?");
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(Utc::now()).bind(id).execute(&mut tx).await?;
        tx.commit().await?;
    }

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

pub async fn set_reset_token_in_db(
    pool: &SqlitePool,
    id: i64,
    token: Option<&str>,
    expires_at: Option<i64>,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE users
        SET reset_password_token = ?1, reset_password_expire = ?2, updated_at = ?3
        WHERE id = ?4
        "#,
    )
    .bind(token)
    .bind(expires_at)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Finds the user owning an unexpired reset token.
pub async fn get_user_by_reset_token(
    pool: &SqlitePool,
    token: &str,
    now: i64,
) -> Result<Option<User>, RequestError> {
    let query = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE reset_password_token = ?1 AND reset_password_expire > ?2"
    );
    let result = sqlx::query_as::<_, User>(&query)
        .bind(token)
        .bind(now)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Stores a new password hash and invalidates any outstanding reset token.
pub async fn update_password_in_db(
    pool: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE users
        SET password = ?1, reset_password_token = NULL, reset_password_expire = NULL, updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(password_hash)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn update_role_in_db(
    pool: &SqlitePool,
    id: i64,
    role: Role,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    tx.commit().await?;

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

pub async fn list_users_in_db(
    pool: &SqlitePool,
    limit: Option<u32>,
) -> Result<Vec<User>, RequestError> {
    let query = format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT ?1"
    );
    // SQLite treats a negative LIMIT as unbounded.
    let limit = limit.map(i64::from).unwrap_or(-1);
    let result = sqlx::query_as::<_, User>(&query)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(result)
}
