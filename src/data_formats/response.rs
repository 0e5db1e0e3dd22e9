use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Analytics, AuthorCount, Blog, BlogStatus, Comment, Role, User, ViewHistoryEntry,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub bio: String,
    pub profile_picture: String,
    pub created_at: DateTime<Utc>,
}

/// What anyone may see about a user.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub profile_picture: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: i64,
    pub name: String,
    pub profile_picture: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: String,
    pub author: AuthorResponse,
    pub status: BlogStatus,
    pub tags: Vec<String>,
    pub likes: Vec<i64>,
    pub likes_count: i64,
    pub views: i64,
    pub read_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BlogDetailResponse {
    #[serde(flatten)]
    pub blog: BlogResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub blog: i64,
    pub user: AuthorResponse,
    pub parent: Option<i64>,
    pub likes: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ViewHistoryResponse {
    pub date: DateTime<Utc>,
    pub count: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub blog: i64,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub views_history: Vec<ViewHistoryResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProfileWithBlogsResponse {
    pub user: ProfileResponse,
    pub blogs: Vec<BlogResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TopAuthorUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TopAuthorResponse {
    pub author: TopAuthorUser,
    pub count: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_blogs: i64,
    pub pending_blogs: i64,
    pub published_blogs: i64,
    pub rejected_blogs: i64,
    pub hidden_blogs: i64,
    pub recent_blogs: Vec<BlogResponse>,
    pub recent_users: Vec<UserResponse>,
    pub top_authors: Vec<TopAuthorResponse>,
    pub total_views: i64,
}

impl UserResponse {
    pub fn new(
        User {
            id,
            name,
            email,
            role,
            bio,
            profile_picture,
            created_at,
            ..
        }: User,
    ) -> Self {
        UserResponse {
            id,
            name,
            email,
            role,
            bio: bio.unwrap_or_default(),
            profile_picture,
            created_at,
        }
    }
}

impl ProfileResponse {
    pub fn new(
        User {
            id,
            name,
            bio,
            profile_picture,
            created_at,
            ..
        }: User,
    ) -> Self {
        ProfileResponse {
            id,
            name,
            bio: bio.unwrap_or_default(),
            profile_picture,
            created_at,
        }
    }
}

impl BlogResponse {
    pub fn new(blog: Blog) -> Self {
        let tags = blog.tags();
        let likes = blog.likes();
        let Blog {
            id,
            title,
            content,
            excerpt,
            cover_image,
            author_id,
            author_name,
            author_picture,
            status,
            views,
            read_time,
            rejection_reason,
            likes_count,
            created_at,
            updated_at,
            ..
        } = blog;
        BlogResponse {
            id,
            title,
            content,
            excerpt,
            cover_image,
            author: AuthorResponse {
                id: author_id,
                name: author_name,
                profile_picture: author_picture,
            },
            status,
            tags,
            likes,
            likes_count,
            views,
            read_time,
            rejection_reason,
            created_at,
            updated_at,
        }
    }
}

impl CommentResponse {
    pub fn new(comment: Comment) -> Self {
        let likes = comment.likes();
        let Comment {
            id,
            content,
            blog_id,
            user_id,
            user_name,
            user_picture,
            parent_id,
            created_at,
            updated_at,
            ..
        } = comment;
        CommentResponse {
            id,
            content,
            blog: blog_id,
            user: AuthorResponse {
                id: user_id,
                name: user_name,
                profile_picture: user_picture,
            },
            parent: parent_id,
            likes,
            created_at,
            updated_at,
        }
    }
}

impl AnalyticsResponse {
    pub fn new(
        Analytics {
            blog_id,
            views,
            likes,
            comments,
            shares,
            ..
        }: Analytics,
        history: Vec<ViewHistoryEntry>,
    ) -> Self {
        AnalyticsResponse {
            blog: blog_id,
            views,
            likes,
            comments,
            shares,
            views_history: history
                .into_iter()
                .map(|ViewHistoryEntry { date, count }| ViewHistoryResponse { date, count })
                .collect(),
        }
    }
}

impl TopAuthorResponse {
    pub fn new(
        AuthorCount {
            author_id,
            name,
            email,
            count,
        }: AuthorCount,
    ) -> Self {
        TopAuthorResponse {
            author: TopAuthorUser {
                id: author_id,
                name,
                email,
            },
            count,
        }
    }
}
