//! Configuration module for the member picker backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! The community token is never part of the configuration; it arrives with each request.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Default community members endpoint.
pub const DEFAULT_UPSTREAM_URL: &str = "https://app.circle.so/api/admin/v2/community_members";

/// Page size bounds accepted by the upstream API.
pub const MIN_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Community members endpoint (without query string)
    pub upstream_url: String,
    /// `per_page` used for the full directory scan
    pub page_size: u32,
    /// How long a fetched member dataset stays valid
    pub cache_ttl: Duration,
    /// Per-request timeout for upstream calls
    pub request_timeout: Duration,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let upstream_url =
            env::var("PICKER_UPSTREAM_URL").unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string());

        let page_size = env::var("PICKER_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(MAX_PAGE_SIZE)
            .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);

        let cache_ttl_hours = env::var("PICKER_CACHE_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(24);

        let request_timeout_secs = env::var("PICKER_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let bind_addr = env::var("PICKER_BIND_ADDR")
            .ok()
            .and_then(|v| match v.parse() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    eprintln!("Ignoring invalid PICKER_BIND_ADDR {:?}: {}", v, e);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let log_level = env::var("PICKER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            upstream_url,
            page_size,
            cache_ttl: Duration::from_secs(cache_ttl_hours * 60 * 60),
            request_timeout: Duration::from_secs(request_timeout_secs),
            bind_addr,
            log_level,
        }
    }
}
