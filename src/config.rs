use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,

    pub api_prefix: String,

    /// Printed on pay statements
    pub company_name: String,

    pub log_dir: String,
    pub log_level: tracing::Level,

    /// Seeds the first administrator when the user table is empty.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            database_url: var_or("DATABASE_URL", "sqlite://payroll.db?mode=rwc"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parse_var("REFRESH_TOKEN_TTL", 604_800)?, // 7 days
            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", 60)?,
            api_prefix: var_or("API_PREFIX", "/api"),
            company_name: var_or("COMPANY_NAME", "Payroll"),
            log_dir: var_or("LOG_DIR", "logs"),
            log_level: parse_var("LOG_LEVEL", tracing::Level::INFO)?,
            bootstrap_admin: bootstrap_admin_from_env(),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Both email and password must be present; there is no fallback credential.
fn bootstrap_admin_from_env() -> Option<BootstrapAdmin> {
    let email = env::var("BOOTSTRAP_ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty())?;
    let password = env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|v| !v.is_empty())?;

    Some(BootstrapAdmin {
        name: var_or("BOOTSTRAP_ADMIN_NAME", "Administrator"),
        email: email.trim().to_string(),
        password,
    })
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 1000,
            api_prefix: "/api".to_string(),
            company_name: "Acme Security".to_string(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
            bootstrap_admin: None,
        }
    }
}
