use reqwest::StatusCode;

use super::{ApiClient, ClientError, ClientResult};
use crate::{
    data_formats::{LoginRequest, RegisterRequest, UserResponse},
    models::Role,
};

/// Who is signed in, as last reported by the server.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub user: Option<UserResponse>,
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Starts out loading until the first [`refresh`](Self::refresh).
    pub fn new() -> Self {
        SessionState {
            user: None,
            loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        matches!(&self.user, Some(user) if user.role == Role::Admin)
    }

    /// Re-fetches the current user. A rejected session leaves the state
    /// signed out rather than failing.
    pub async fn refresh(&mut self, client: &ApiClient) -> ClientResult<()> {
        self.loading = true;
        let result = client.me().await;
        self.loading = false;
        match result {
            Ok(response) => {
                self.user = Some(response.data);
                Ok(())
            }
            Err(ClientError::Api {
                status: StatusCode::UNAUTHORIZED,
                ..
            }) => {
                self.user = None;
                Ok(())
            }
            Err(e) => {
                self.user = None;
                Err(e)
            }
        }
    }

    pub async fn login(
        &mut self,
        client: &mut ApiClient,
        email: &str,
        password: &str,
    ) -> ClientResult<&UserResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = client.login(&request).await?;
        Ok(self.user.insert(response.user))
    }

    pub async fn register(
        &mut self,
        client: &mut ApiClient,
        request: &RegisterRequest,
    ) -> ClientResult<&UserResponse> {
        let response = client.register(request).await?;
        Ok(self.user.insert(response.user))
    }

    /// Signs out locally even when the server call fails.
    pub async fn logout(&mut self, client: &mut ApiClient) -> ClientResult<()> {
        let result = client.logout().await;
        self.user = None;
        result.map(|_| ())
    }
}
