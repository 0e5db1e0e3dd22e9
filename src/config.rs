use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub host: String,
    pub port: u16,
    pub client_url: String,
    pub production: bool,
    pub view_window_hours: i64,
    pub reset_token_minutes: i64,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let environment = try_load::<String>("ENVIRONMENT", "development")?;
        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                name: try_load("ADMIN_NAME", "Administrator")?,
                email,
                password,
            }),
            _ => None,
        };
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expire_days: try_load("JWT_EXPIRE_DAYS", "30")?,
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "5000")?,
            client_url: try_load("CLIENT_URL", "http://localhost:5173")?,
            production: environment == "production",
            view_window_hours: try_load("VIEW_WINDOW_HOURS", "24")?,
            reset_token_minutes: try_load("RESET_TOKEN_MINUTES", "10")?,
            admin,
        })
    }

    /// Defaults suitable for tests and local tooling.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expire_days: 30,
            host: "127.0.0.1".to_string(),
            port: 5000,
            client_url: "http://localhost:5173".to_string(),
            production: false,
            view_window_hours: 24,
            reset_token_minutes: 10,
            admin: None,
        }
    }

    pub fn address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("Invalid HOST/PORT configuration")
    }

    pub fn blog_url(&self, blog_id: i64) -> String {
        format!("{}/blogs/{}", self.client_url.trim_end_matches('/'), blog_id)
    }

    pub fn reset_url(&self, token: &str) -> String {
        format!(
            "{}/reset-password/{}",
            self.client_url.trim_end_matches('/'),
            token
        )
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value {value:?}: {e}"))
}
