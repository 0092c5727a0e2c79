use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub smtp: SmtpConfig,
    /// Role label the interview questions are written for.
    pub target_role: String,
    /// Upper bound on generative-service calls in flight across all evaluations.
    pub llm_max_in_flight: usize,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            smtp: SmtpConfig {
                host: require_env("SMTP_HOST")?,
                port: parse_env("SMTP_PORT", 587)?,
                username: require_env("SMTP_USERNAME")?,
                password: require_env("SMTP_PASSWORD")?,
                from_address: require_env("MAIL_FROM")?,
            },
            target_role: std::env::var("TARGET_ROLE")
                .unwrap_or_else(|_| "Software Engineer".to_string()),
            llm_max_in_flight: parse_env("LLM_MAX_IN_FLIGHT", 8)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
