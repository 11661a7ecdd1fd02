use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hostel-desk.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the hostel backend, without a trailing slash.
    pub api_base_url: String,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub exit_poll_interval_secs: u64,
    pub toast_capacity: usize,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let api_base_url = env::var("HOSTEL_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let exit_poll_interval_secs = parse_var("EXIT_POLL_SECS", 5u64)?;
        if exit_poll_interval_secs == 0 {
            return Err(AppError::Config("EXIT_POLL_SECS must be greater than zero".to_string()));
        }
        let toast_capacity = parse_var("TOAST_CAPACITY", 50usize)?;

        Ok(Self {
            api_base_url,
            database_url,
            bind_addr,
            exit_poll_interval_secs,
            toast_capacity,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{} is invalid: {}", key, e))),
        Err(_) => {
            tracing::debug!("{} not set, using default", key);
            Ok(default)
        }
    }
}
