// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the interception pipeline
//!
//! Nothing here is allowed to escape into the host's network stack: the
//! pipeline catches and logs failures at every public entry point, so these
//! types mostly surface through listener implementations and tests.

use thiserror::Error;

/// Result type alias for mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A stage listener failed
    #[error("Listener '{listener}' failed in {stage} stage: {message}")]
    Listener {
        stage: String,
        listener: String,
        message: String,
    },

    /// Host channel operation failed
    #[error("Channel error: {0}")]
    Channel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a listener error
    pub fn listener(
        stage: impl Into<String>,
        listener: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Listener {
            stage: stage.into(),
            listener: listener.into(),
            message: message.into(),
        }
    }

    /// Create a channel error
    pub fn channel<S: Into<String>>(msg: S) -> Self {
        Error::Channel(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a listener error
    pub fn is_listener(&self) -> bool {
        matches!(self, Error::Listener { .. })
    }

    /// Check if this is a channel error
    pub fn is_channel(&self) -> bool {
        matches!(self, Error::Channel(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_error() {
        let err = Error::listener("before-request", "ad-blocker", "lookup failed");
        assert!(err.is_listener());
        assert_eq!(
            err.to_string(),
            "Listener 'ad-blocker' failed in before-request stage: lookup failed"
        );
    }

    #[test]
    fn test_url_error() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_string_conversion() {
        let err: Error = "something broke".into();
        assert_eq!(err.to_string(), "something broke");
    }
}
