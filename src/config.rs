//! Runtime configuration read from the environment (and `.env`).

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

use crate::error::{Error, Result};

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(mode) if mode == "production" => RunMode::Production,
            _ => RunMode::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: RunMode,
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub session_secret: String,
    pub allowed_origins: Vec<String>,
    pub bind_addr: SocketAddr,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars().collect())
    }

    /// Builds the config from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key)
                .map(str::to_string)
                .ok_or_else(|| Error::config(format!("{} must be set", key)))
        };

        let mode = RunMode::parse(get("RUST_ENV"));

        let mut raw_url = require("SUPABASE_URL")?;
        // Url::join drops the last path segment unless it ends with a slash.
        if !raw_url.ends_with('/') {
            raw_url.push('/');
        }
        let supabase_url = Url::parse(&raw_url)
            .map_err(|e| Error::config(format!("SUPABASE_URL is not a valid URL: {}", e)))?;

        let supabase_anon_key = require("SUPABASE_ANON_KEY")?;

        let session_secret = require("SESSION_SECRET")?;
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "SESSION_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let allowed_origins: Vec<String> = get("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if mode == RunMode::Production && allowed_origins.is_empty() {
            return Err(Error::config("ALLOWED_ORIGINS must be set in production"));
        }

        let bind_addr = get("BIND_ADDR")
            .unwrap_or("0.0.0.0:8080")
            .parse::<SocketAddr>()
            .map_err(|e| Error::config(format!("BIND_ADDR is invalid: {}", e)))?;

        let rate_limit_per_second = get("RATE_LIMIT_PER_SECOND")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(50);
        let rate_limit_burst = get("RATE_LIMIT_BURST")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(100);

        let static_dir = PathBuf::from(get("STATIC_DIR").unwrap_or("static"));

        Ok(Self {
            mode,
            supabase_url,
            supabase_anon_key,
            session_secret,
            allowed_origins,
            bind_addr,
            rate_limit_per_second,
            rate_limit_burst,
            static_dir,
        })
    }

    pub fn is_production(&self) -> bool {
        self.mode == RunMode::Production
    }

    /// Milliseconds for the rate limiter to restore one request, so a client
    /// sustains `rate_limit_per_second` after spending its burst.
    pub fn replenish_interval_ms(&self) -> u64 {
        (1000 / self.rate_limit_per_second).max(1)
    }
}
