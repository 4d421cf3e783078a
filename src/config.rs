use std::{env, path::PathBuf};

use anyhow::Context;

/// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Directory holding `uploads/` and `images/`, served as static files.
    pub web_root: PathBuf,
    /// Largest accepted image file. The request body may be larger by
    /// [`MULTIPART_OVERHEAD_BYTES`].
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = Self::database_url_from_env()?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let web_root = env::var("WEB_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("wwwroot"));
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|b| b.parse::<usize>().ok())
            .unwrap_or(5 * 1024 * 1024);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_hours,
            web_root,
            max_upload_bytes,
        })
    }

    pub fn max_request_bytes(&self) -> usize {
        self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)
    }

    /// Only the database URL, for tools that never issue tokens.
    pub fn database_url_from_env() -> anyhow::Result<String> {
        env::var("DATABASE_URL").context("DATABASE_URL is not set")
    }

    /// Configuration for tests and tools that never bind a socket.
    pub fn for_database(database_url: impl Into<String>, web_root: impl Into<PathBuf>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "local-development-secret".to_string(),
            jwt_ttl_hours: 24,
            web_root: web_root.into(),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}
