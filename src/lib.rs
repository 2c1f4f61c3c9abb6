//! Sitewalk: a single-host link walker
//!
//! This crate crawls every in-site page reachable from a seed URL, classifies
//! each discovered link as internal, alias, external or anomalous, and emits a
//! JSON report of visited pages, status codes and anomalies.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitewalk operations
///
/// Only seed and configuration problems surface here; per-page failures are
/// recorded in the report instead (see [`crawler::FetchError`]).
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::UnitState,
        to: state::UnitState,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Seed URL errors. These are the only fatal errors of a run.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL must be absolute (scheme and host): {0}")]
    NotAbsolute(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sitewalk operations
pub type Result<T> = std::result::Result<T, WalkError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{UnitState, VisitedSet};
pub use url::{classify, Classification, LinkKind, SeedContext};
