//! Client configuration.
//!
//! The base address is an explicit value handed to the client constructor.
//! `from_env` is a convenience for binaries; library code never reads the
//! environment behind the caller's back.

pub const BASE_URL_ENV: &str = "ORDER_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `ORDER_API_URL`, falling back to `http://localhost:5000` when it
    /// is unset or blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}
