use anyhow::{Context, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/property_directory.db";
/// Output file of the `generate-sitemap` binary when `SITEMAP_PATH` is unset.
pub const DEFAULT_SITEMAP_PATH: &str = "sitemap.json";

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_url: String,

    // Server
    pub port: u16,

    // Language detection
    pub langdetect_api_url: String,
    pub langdetect_api_key: Option<String>,
    pub langdetect_min_confidence: f64,

    // Bootstrap superuser (created on startup when username and password are set)
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Storage
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Language detection
            langdetect_api_url: std::env::var("LANGDETECT_API_URL")
                .context("LANGDETECT_API_URL not set")?,
            langdetect_api_key: non_empty_var("LANGDETECT_API_KEY"),
            langdetect_min_confidence: std::env::var("LANGDETECT_MIN_CONFIDENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),

            // Bootstrap superuser
            admin_username: non_empty_var("ADMIN_USERNAME"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            admin_email: non_empty_var("ADMIN_EMAIL"),
        })
    }

    /// Username, email and password for the bootstrap superuser, if configured.
    ///
    /// The email falls back to an empty string.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(username), Some(password)) => Some((
                username.as_str(),
                self.admin_email.as_deref().unwrap_or(""),
                password.as_str(),
            )),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
