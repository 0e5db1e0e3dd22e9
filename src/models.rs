use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator used by the `Group_concat` aggregates so tags may contain commas.
pub const LIST_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("'{}' is not a valid role", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    Pending,
    Published,
    Rejected,
    Hidden,
}

impl BlogStatus {
    pub const ALL: [BlogStatus; 5] = [
        BlogStatus::Draft,
        BlogStatus::Pending,
        BlogStatus::Published,
        BlogStatus::Rejected,
        BlogStatus::Hidden,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Pending => "pending",
            BlogStatus::Published => "published",
            BlogStatus::Rejected => "rejected",
            BlogStatus::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BlogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlogStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("'{}' is not a valid blog status", s))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub bio: Option<String>,
    pub profile_picture: String,
    pub reset_password_token: Option<String>,
    pub reset_password_expire: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A blog joined with its author and aggregated tag/like lists.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: String,
    pub author_id: i64,
    pub author_name: String,
    pub author_picture: String,
    pub status: BlogStatus,
    pub views: i64,
    pub read_time: i64,
    pub rejection_reason: Option<String>,
    pub tag_list: Option<String>,
    pub like_list: Option<String>,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    pub fn tags(&self) -> Vec<String> {
        split_list(self.tag_list.as_deref())
    }

    pub fn likes(&self) -> Vec<i64> {
        split_list(self.like_list.as_deref())
            .into_iter()
            .filter_map(|id| id.parse().ok())
            .collect()
    }

    pub fn is_liked_by(&self, user_id: i64) -> bool {
        self.likes().contains(&user_id)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub blog_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_picture: String,
    pub parent_id: Option<i64>,
    pub like_list: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn likes(&self) -> Vec<i64> {
        split_list(self.like_list.as_deref())
            .into_iter()
            .filter_map(|id| id.parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Analytics {
    pub blog_id: i64,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ViewHistoryEntry {
    pub date: DateTime<Utc>,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthorCount {
    pub author_id: i64,
    pub name: String,
    pub email: String,
    pub count: i64,
}

fn split_list(list: Option<&str>) -> Vec<String> {
    match list {
        Some(list) if !list.is_empty() => list
            .split(LIST_SEPARATOR)
            .map(|s| s.to_string())
            .collect(),
        _ => vec![],
    }
}
