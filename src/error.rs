//! Error types for the email onboarding coordinator.
//!
//! The coordinator itself is infallible; these cover the edges around it
//! (configuration and decoding the profile handed in by the caller).

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors decoding a profile snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Malformed profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read profile from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No profile provided")]
    Missing,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
