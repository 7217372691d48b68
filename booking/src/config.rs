//! Configuration management for the booking client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that are present but unparseable fall back to the default.

use crate::fare::DEFAULT_SEAT_PRICE;
use crate::selection::DEFAULT_MAX_SEATS;
use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    pub api: ApiConfig,
    /// Seat selection and checkout configuration
    pub booking: BookingConfig,
    /// Admin panel configuration
    pub admin: AdminConfig,
    /// Log filter (`RUST_LOG` syntax)
    pub log_level: String,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:5000/api`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Seat selection and checkout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Seats one booking may hold
    pub max_seats: usize,
    /// Price of a seat whose category is missing from the movie's price table
    pub default_seat_price: Money,
    /// Seconds to wait for the booking service to answer a submission
    pub submit_timeout_secs: u64,
}

/// Admin panel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Admin session lifetime in seconds
    pub session_ttl_secs: u64,
    /// Directory backups are written to
    pub backup_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for missing or invalid values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let positive = |key: &str| parsed(key).filter(|n| *n > 0);

        Self {
            api: ApiConfig {
                base_url: lookup("CINEMA_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .filter(|url| !url.is_empty())
                    .unwrap_or_else(|| "http://localhost:5000/api".to_string()),
                timeout_secs: positive("CINEMA_API_TIMEOUT_SECS").unwrap_or(10),
            },
            booking: BookingConfig {
                max_seats: positive("CINEMA_MAX_SEATS")
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(DEFAULT_MAX_SEATS),
                default_seat_price: lookup("CINEMA_DEFAULT_SEAT_PRICE")
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .and_then(Money::from_decimal)
                    .unwrap_or(DEFAULT_SEAT_PRICE),
                submit_timeout_secs: positive("CINEMA_SUBMIT_TIMEOUT_SECS").unwrap_or(30),
            },
            admin: AdminConfig {
                session_ttl_secs: positive("CINEMA_ADMIN_SESSION_TTL_SECS").unwrap_or(86_400),
                backup_dir: lookup("CINEMA_BACKUP_DIR")
                    .filter(|dir| !dir.trim().is_empty())
                    .map_or_else(|| PathBuf::from("."), PathBuf::from),
            },
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ApiConfig {
    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BookingConfig {
    /// Submission timeout
    #[must_use]
    pub const fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}

impl AdminConfig {
    /// Session lifetime
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
