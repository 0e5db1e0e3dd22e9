use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_BIO_LENGTH: usize = 200;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_EXCERPT_LENGTH: usize = 200;
pub const MAX_COMMENT_LENGTH: usize = 500;

// ----------------- Auth Request -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RoleRequest {
    pub role: String,
}

// ----------------- Blog Request -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
}

/// Keys outside these fields are rejected, so an update never writes part
/// of what was asked.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct CommentRequest {
    pub content: String,
    pub parent: Option<i64>,
}

// ----------------- Validation -----------------

impl RegisterRequest {
    pub fn validate(self) -> Result<Self, RequestError> {
        Ok(RegisterRequest {
            name: validate_name(&self.name)?,
            email: validate_email(&self.email)?,
            password: validate_password(self.password)?,
        })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Self, RequestError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(RequestError::validation(
                "Please provide an email and password",
            ));
        }
        Ok(LoginRequest {
            email: self.email.trim().to_lowercase(),
            password: self.password,
        })
    }
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<Self, RequestError> {
        let name = self.name.as_deref().map(validate_name).transpose()?;
        let bio = match self.bio {
            Some(bio) => {
                let bio = bio.trim().to_string();
                if bio.chars().count() > MAX_BIO_LENGTH {
                    return Err(RequestError::validation(format!(
                        "Bio cannot be more than {} characters",
                        MAX_BIO_LENGTH
                    )));
                }
                Some(bio)
            }
            None => None,
        };
        let profile_picture = self
            .profile_picture
            .map(|picture| picture.trim().to_string())
            .filter(|picture| !picture.is_empty());
        Ok(UpdateProfileRequest {
            name,
            bio,
            profile_picture,
        })
    }
}

impl CreateBlogRequest {
    pub fn validate(self) -> Result<Self, RequestError> {
        Ok(CreateBlogRequest {
            title: validate_title(&self.title)?,
            content: validate_content(self.content)?,
            excerpt: validate_excerpt(&self.excerpt)?,
            cover_image: self
                .cover_image
                .map(|image| image.trim().to_string())
                .filter(|image| !image.is_empty()),
            tags: normalize_tags(self.tags),
        })
    }
}

impl UpdateBlogRequest {
    pub fn validate(self) -> Result<Self, RequestError> {
        Ok(UpdateBlogRequest {
            title: self.title.as_deref().map(validate_title).transpose()?,
            content: self.content.map(validate_content).transpose()?,
            excerpt: self.excerpt.as_deref().map(validate_excerpt).transpose()?,
            cover_image: self
                .cover_image
                .map(|image| image.trim().to_string())
                .filter(|image| !image.is_empty()),
            tags: self.tags.map(normalize_tags),
            status: self.status,
            rejection_reason: self.rejection_reason,
        })
    }

    /// True when the request carries a field only administrators may write.
    pub fn touches_admin_fields(&self) -> bool {
        self.status.is_some() || self.rejection_reason.is_some()
    }

    pub fn touches_title_or_content(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.cover_image.is_none()
            && self.tags.is_none()
            && self.status.is_none()
            && self.rejection_reason.is_none()
    }
}

impl CommentRequest {
    pub fn validate(self) -> Result<Self, RequestError> {
        let content = self.content.trim().to_string();
        if content.is_empty() {
            return Err(RequestError::validation("Comment cannot be empty"));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(RequestError::validation(format!(
                "Comment cannot be more than {} characters",
                MAX_COMMENT_LENGTH
            )));
        }
        Ok(CommentRequest {
            content,
            parent: self.parent,
        })
    }
}

pub fn validate_name(name: &str) -> Result<String, RequestError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RequestError::validation("Please provide your name"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(RequestError::validation(format!(
            "Name cannot be more than {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

pub fn validate_email(email: &str) -> Result<String, RequestError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(RequestError::validation("Please provide your email"));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(RequestError::validation("Please provide a valid email"));
    }
    Ok(email)
}

pub fn validate_password(password: String) -> Result<String, RequestError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(RequestError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(password)
}

fn validate_title(title: &str) -> Result<String, RequestError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RequestError::validation("Please provide a title"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(RequestError::validation(format!(
            "Title cannot be more than {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: String) -> Result<String, RequestError> {
    if content.trim().is_empty() {
        return Err(RequestError::validation("Please provide content"));
    }
    Ok(content)
}

fn validate_excerpt(excerpt: &str) -> Result<String, RequestError> {
    let excerpt = excerpt.trim();
    if excerpt.is_empty() {
        return Err(RequestError::validation("Please provide an excerpt"));
    }
    if excerpt.chars().count() > MAX_EXCERPT_LENGTH {
        return Err(RequestError::validation(format!(
            "Excerpt cannot be more than {} characters",
            MAX_EXCERPT_LENGTH
        )));
    }
    Ok(excerpt.to_string())
}

/// Tags form a set: trimmed, empty entries dropped, first occurrence wins.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !result.iter().any(|existing| existing == tag) {
            result.push(tag.to_string());
        }
    }
    result
}
