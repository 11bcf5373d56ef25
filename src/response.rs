//! Request and response envelopes for serving cleaned articles.
//!
//! A successful reply serializes as
//! `{"status": "success", "response": "<cleaned text>"}` and a failed one as
//! `{"status": "error", "error": "<message>"}`.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Prefix for messages of unexpected failures.
const INTERNAL_ERROR_PREFIX: &str = "Oops! Something went wrong. Please try again later";

/// Body of a clean request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CleanRequest {
    /// Article URL to fetch and clean.
    #[serde(default)]
    pub url: Option<String>,
}

impl CleanRequest {
    /// Creates a request for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    /// Returns the URL if present and not blank.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Status-tagged response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    /// Cleaned text.
    Success { response: String },
    /// Failure description.
    Error { error: String },
}

impl Envelope {
    pub fn success(text: impl Into<String>) -> Self {
        Envelope::Success {
            response: text.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            error: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Outcome class of a reply, mapped to an HTTP-style status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    BadRequest,
    InternalError,
}

impl ReplyStatus {
    /// Numeric status code (200, 400 or 500).
    pub fn code(self) -> u16 {
        match self {
            ReplyStatus::Ok => 200,
            ReplyStatus::BadRequest => 400,
            ReplyStatus::InternalError => 500,
        }
    }
}

/// A status paired with its envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: ReplyStatus,
    pub envelope: Envelope,
}

impl Reply {
    /// Successful reply carrying cleaned text.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Ok,
            envelope: Envelope::success(text),
        }
    }

    /// Builds the reply for a failed request.
    ///
    /// Request problems are reported verbatim with [`ReplyStatus::BadRequest`];
    /// anything else becomes a generic internal error with the cause appended.
    pub fn from_error(err: &Error) -> Self {
        if err.is_client_error() {
            Self {
                status: ReplyStatus::BadRequest,
                envelope: Envelope::error(err.to_string()),
            }
        } else {
            Self {
                status: ReplyStatus::InternalError,
                envelope: Envelope::error(format!("{}: {}", INTERNAL_ERROR_PREFIX, err)),
            }
        }
    }
}

impl From<crate::Result<String>> for Reply {
    fn from(result: crate::Result<String>) -> Self {
        match result {
            Ok(text) => Reply::ok(text),
            Err(err) => Reply::from_error(&err),
        }
    }
}
