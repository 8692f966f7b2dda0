//! Error types for the DDNS updater
//!
//! This module defines all error types used throughout the workspace.

use crate::traits::IpVersion;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure while querying an IP echo endpoint
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Every attempt returned a malformed or wrong-family address
    #[error("Unable to resolve public {version} address after {attempts} attempts")]
    ResolutionExhausted {
        /// Family that was being resolved
        version: IpVersion,
        /// Number of attempts made
        attempts: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required environment variable is unset or empty
    #[error("{0} must be defined in ENV")]
    MissingEnv(&'static str),

    /// An environment variable holds a value that cannot be used
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Raw value as found in the environment
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid environment value error
    pub fn invalid_env(
        name: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEnv {
            name,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from reading the environment at startup
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::MissingEnv(_) | Self::InvalidEnv { .. }
        )
    }
}
