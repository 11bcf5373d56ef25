//! Error types for webtext library.
//!
//! The cleaning rules themselves never fail. Errors come from building a
//! [`Cleaner`](crate::Cleaner) with a custom word list and from the
//! fetch-and-clean layer.

use std::io;
use thiserror::Error;

/// Result type alias for webtext operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for webtext library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading or writing documents.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configured pattern (e.g. a boilerplate word list) failed to compile.
    #[error("Invalid cleanup pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The request carried no article URL.
    #[error("Missing web article 'url' in request body")]
    MissingUrl,

    /// The article URL could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The article URL uses a scheme other than http or https.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The fetcher failed before producing a response.
    #[error("Failed to fetch data: {0}")]
    Fetch(String),

    /// The fetcher reported a non-success status.
    #[error("Failed to fetch data: Status {status}")]
    FetchStatus { status: u16 },

    /// A blocking cleanup task panicked or was cancelled.
    #[error("Cleanup task failed: {0}")]
    Task(String),
}

impl Error {
    /// Returns true if the error was caused by the request itself rather
    /// than by fetching or cleaning.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingUrl | Error::InvalidUrl { .. } | Error::UnsupportedScheme(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_status_message() {
        let err = Error::FetchStatus { status: 404 };
        assert_eq!(err.to_string(), "Failed to fetch data: Status 404");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::MissingUrl.is_client_error());
        assert!(Error::UnsupportedScheme("ftp".into()).is_client_error());
        assert!(!Error::Fetch("connection reset".into()).is_client_error());
        assert!(!Error::Task("panicked".into()).is_client_error());
    }
}
