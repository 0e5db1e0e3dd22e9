//! Typed HTTP client for the blog API.
//!
//! [`ApiClient`] maps one method to each endpoint and remembers the session
//! token handed out at login. [`SessionState`] and [`BlogListState`] hold the
//! state a front end keeps between requests and are refreshed explicitly.
mod blog_list;
mod session;

pub use blog_list::BlogListState;
pub use session::SessionState;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    data_formats::{
        AnalyticsResponse, AuthResponse, BlogDetailResponse, BlogQueryParams, BlogResponse,
        CommentRequest, CommentResponse, CreateBlogRequest, DataWrapper, ForgotPasswordRequest,
        ListWrapper, LoginRequest, MessageWrapper, PagedListWrapper, ProfileWithBlogsResponse,
        RegisterRequest, RejectRequest, ResetPasswordRequest, RoleRequest, StatsResponse,
        UpdateBlogRequest, UpdatePasswordRequest, UpdateProfileRequest, UserResponse,
    },
    errors::RequestErrorJsonWrapper,
    models::{BlogStatus, Role},
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http(e) => e.status(),
            ClientError::Api { status, .. } => Some(*status),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    forwarded_for: Option<String>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            forwarded_for: None,
        }
    }

    /// Sends `X-Forwarded-For` with every request, as a proxy in front of the
    /// server would.
    pub fn forwarded_for(mut self, ip: impl Into<String>) -> Self {
        self.forwarded_for = Some(ip.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ip) = &self.forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let message = match response.json::<RequestErrorJsonWrapper>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("error").to_string(),
        };
        Err(ClientError::Api { status, message })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::DELETE, path)).await
    }

    async fn with_body<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(method, path).json(body)).await
    }

    fn keep_session(&mut self, response: AuthResponse) -> AuthResponse {
        self.token = Some(response.token.clone());
        response
    }

    pub async fn health(&self) -> ClientResult<MessageWrapper> {
        self.get("/health").await
    }

    // ----------------- Auth -----------------
    pub async fn register(&mut self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        let response = self
            .with_body(Method::POST, "/api/auth/register", request)
            .await?;
        Ok(self.keep_session(response))
    }

    pub async fn login(&mut self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        let response = self
            .with_body(Method::POST, "/api/auth/login", request)
            .await?;
        Ok(self.keep_session(response))
    }

    /// Ends the session on the server; the local token is dropped either way.
    pub async fn logout(&mut self) -> ClientResult<MessageWrapper> {
        let result = self
            .send(self.request(Method::POST, "/api/auth/logout"))
            .await;
        self.token = None;
        result
    }

    pub async fn me(&self) -> ClientResult<DataWrapper<UserResponse>> {
        self.get("/api/auth/me").await
    }

    pub async fn update_password(
        &mut self,
        request: &UpdatePasswordRequest,
    ) -> ClientResult<AuthResponse> {
        let response = self
            .with_body(Method::PUT, "/api/auth/update-password", request)
            .await?;
        Ok(self.keep_session(response))
    }

    pub async fn forgot_password(&self, email: &str) -> ClientResult<MessageWrapper> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.with_body(Method::POST, "/api/auth/forgot-password", &request)
            .await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> ClientResult<MessageWrapper> {
        let request = ResetPasswordRequest {
            password: password.to_string(),
        };
        self.with_body(
            Method::PUT,
            &format!("/api/auth/reset-password/{token}"),
            &request,
        )
        .await
    }

    // ----------------- Blogs -----------------
    pub async fn list_blogs(
        &self,
        params: &BlogQueryParams,
    ) -> ClientResult<PagedListWrapper<BlogResponse>> {
        self.send(self.request(Method::GET, "/api/blogs").query(params))
            .await
    }

    pub async fn trending_blogs(&self, limit: u32) -> ClientResult<ListWrapper<BlogResponse>> {
        self.send(
            self.request(Method::GET, "/api/blogs/trending")
                .query(&[("limit", limit)]),
        )
        .await
    }

    pub async fn get_blog(&self, id: i64) -> ClientResult<DataWrapper<BlogDetailResponse>> {
        self.get(&format!("/api/blogs/{id}")).await
    }

    pub async fn create_blog(
        &self,
        request: &CreateBlogRequest,
    ) -> ClientResult<DataWrapper<BlogResponse>> {
        self.with_body(Method::POST, "/api/blogs", request).await
    }

    pub async fn update_blog(
        &self,
        id: i64,
        request: &UpdateBlogRequest,
    ) -> ClientResult<DataWrapper<BlogResponse>> {
        self.with_body(Method::PUT, &format!("/api/blogs/{id}"), request)
            .await
    }

    pub async fn delete_blog(&self, id: i64) -> ClientResult<MessageWrapper> {
        self.delete(&format!("/api/blogs/{id}")).await
    }

    pub async fn like_blog(&self, id: i64) -> ClientResult<DataWrapper<BlogResponse>> {
        self.send(self.request(Method::PUT, &format!("/api/blogs/{id}/like")))
            .await
    }

    pub async fn blog_analytics(&self, id: i64) -> ClientResult<DataWrapper<AnalyticsResponse>> {
        self.get(&format!("/api/blogs/{id}/analytics")).await
    }

    // ----------------- Comments -----------------
    pub async fn add_comment(
        &self,
        blog_id: i64,
        content: &str,
        parent: Option<i64>,
    ) -> ClientResult<DataWrapper<CommentResponse>> {
        let request = CommentRequest {
            content: content.to_string(),
            parent,
        };
        self.with_body(
            Method::POST,
            &format!("/api/blogs/{blog_id}/comments"),
            &request,
        )
        .await
    }

    pub async fn comments(&self, blog_id: i64) -> ClientResult<ListWrapper<CommentResponse>> {
        self.get(&format!("/api/blogs/{blog_id}/comments")).await
    }

    pub async fn like_comment(&self, id: i64) -> ClientResult<DataWrapper<CommentResponse>> {
        self.send(self.request(Method::PUT, &format!("/api/comments/{id}/like")))
            .await
    }

    // ----------------- Users -----------------
    pub async fn user_profile(
        &self,
        id: i64,
    ) -> ClientResult<DataWrapper<ProfileWithBlogsResponse>> {
        self.get(&format!("/api/users/{id}")).await
    }

    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> ClientResult<DataWrapper<UserResponse>> {
        self.with_body(Method::PUT, "/api/users/profile", request)
            .await
    }

    pub async fn my_blogs(&self) -> ClientResult<ListWrapper<BlogResponse>> {
        self.get("/api/users/blogs/me").await
    }

    pub async fn liked_blogs(&self) -> ClientResult<ListWrapper<BlogResponse>> {
        self.get("/api/users/blogs/liked").await
    }

    pub async fn user_blogs(&self, id: i64) -> ClientResult<ListWrapper<BlogResponse>> {
        self.get(&format!("/api/users/{id}/blogs")).await
    }

    // ----------------- Admin -----------------
    pub async fn admin_stats(&self) -> ClientResult<DataWrapper<StatsResponse>> {
        self.get("/api/admin/stats").await
    }

    pub async fn admin_blogs(
        &self,
        status: Option<BlogStatus>,
    ) -> ClientResult<ListWrapper<BlogResponse>> {
        let mut builder = self.request(Method::GET, "/api/admin/blogs");
        if let Some(status) = status {
            builder = builder.query(&[("status", status.as_str())]);
        }
        self.send(builder).await
    }

    pub async fn pending_blogs(&self) -> ClientResult<ListWrapper<BlogResponse>> {
        self.get("/api/admin/blogs/pending").await
    }

    pub async fn approve_blog(&self, id: i64) -> ClientResult<DataWrapper<BlogResponse>> {
        self.send(self.request(Method::PUT, &format!("/api/admin/blogs/{id}/approve")))
            .await
    }

    pub async fn reject_blog(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> ClientResult<DataWrapper<BlogResponse>> {
        let request = RejectRequest {
            reason: reason.map(str::to_string),
        };
        self.with_body(
            Method::PUT,
            &format!("/api/admin/blogs/{id}/reject"),
            &request,
        )
        .await
    }

    pub async fn hide_blog(&self, id: i64) -> ClientResult<DataWrapper<BlogResponse>> {
        self.send(self.request(Method::PUT, &format!("/api/admin/blogs/{id}/hide")))
            .await
    }

    pub async fn admin_delete_blog(&self, id: i64) -> ClientResult<MessageWrapper> {
        self.delete(&format!("/api/admin/blogs/{id}")).await
    }

    pub async fn users(&self) -> ClientResult<ListWrapper<UserResponse>> {
        self.get("/api/admin/users").await
    }

    pub async fn set_role(&self, id: i64, role: Role) -> ClientResult<DataWrapper<UserResponse>> {
        let request = RoleRequest {
            role: role.to_string(),
        };
        self.with_body(Method::PUT, &format!("/api/admin/users/{id}/role"), &request)
            .await
    }
}
