//! Common error types for Bluestone

use thiserror::Error;

/// Common result type for Bluestone operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the Bluestone crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
