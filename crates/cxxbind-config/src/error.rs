//! Error types for cxxbind-config.

use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A hook name in `hooks.order` is not known.
    #[error("Unknown hook `{0}` (expected `reference_out` or `sentinel_error`)")]
    UnknownHook(String),

    /// The same hook is listed twice in `hooks.order`.
    #[error("Hook `{0}` is listed more than once")]
    DuplicateHook(String),
}
