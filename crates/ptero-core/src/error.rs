//! Error types for panel operations.
//!
//! This module provides the error taxonomy shared by every panel client crate,
//! and the single translation step that turns a raw transport failure into one
//! of those kinds.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::transport::HttpFailure;

/// Retry-after used when a 429 response carries no usable header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Main error type for panel operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Request rejected as malformed, remotely or by a local precondition
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable summary
        message: String,
        /// Field-level problems reported by the panel
        errors: Vec<FieldError>,
    },

    /// Credentials rejected or permission denied
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced resource does not exist
    #[error("{resource} with ID {identifier} not found")]
    NotFound {
        /// Resource kind (e.g. "Server")
        resource: String,
        /// Identifier that was looked up
        identifier: String,
    },

    /// The panel itself rate limited the request
    #[error("Rate limit exceeded. Try again in {} seconds", retry_after.as_secs())]
    RateLimited {
        /// How long the panel asked us to wait
        retry_after: Duration,
    },

    /// Any other non-2xx response
    #[error("Panel error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// No response was received at all
    #[error("Network error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Failed to parse a panel response
    #[error("Failed to parse panel response: {0}")]
    ParseError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Specialized result type for panel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field, or "unknown"
    pub field: String,
    /// What was wrong with it
    pub detail: String,
}

impl FieldError {
    /// Create a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            detail: detail.into(),
        }
    }
}

impl Error {
    /// Build a validation error without field details.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMIT",
            Self::Api { status: 500, .. } => "SERVER_ERROR",
            Self::Api { .. } => "UNKNOWN_ERROR",
            Self::Transport(_) => "NETWORK_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status associated with the error, when one applies.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// How long to back off before retrying, for panel-side rate limits.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::InternalError(_) | Self::ConfigError(_) | Self::Api { status: 500..=599, .. }
        )
    }
}

/// Describes the call that failed, so a 404 can name what was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Resource kind, e.g. "User"
    pub resource: Option<String>,
    /// Identifier used in the request
    pub identifier: Option<String>,
    /// Short description of the operation, e.g. "suspending server"
    pub action: Option<String>,
}

impl ErrorContext {
    /// Create a context for the given resource kind.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            identifier: None,
            action: None,
        }
    }

    /// Attach the identifier used in the request.
    #[must_use]
    pub fn identifier(mut self, identifier: impl ToString) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    /// Attach a description of the operation.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    fn describe(&self) -> &str {
        self.action.as_deref().unwrap_or("making request")
    }
}

/// Translate a raw transport failure into an [`Error`].
///
/// This is the only place HTTP statuses are interpreted.
#[must_use]
pub fn translate_failure(failure: HttpFailure, context: &ErrorContext) -> Error {
    let (status, body, retry_after) = match failure {
        HttpFailure::Transport { message } => {
            return Error::Transport(format!(
                "No response received while {}: {message}",
                context.describe()
            ));
        }
        HttpFailure::Status {
            status,
            body,
            retry_after,
        } => (status, body, retry_after),
    };

    let message = body_message(&body);
    match status {
        400 | 422 => {
            let fallback = if status == 400 {
                "Invalid request"
            } else {
                "Validation failed"
            };
            Error::Validation {
                message: message.unwrap_or_else(|| fallback.to_string()),
                errors: field_errors(&body),
            }
        }
        401 => Error::Unauthorized(message.unwrap_or_else(|| "Authentication failed".to_string())),
        403 => Error::Unauthorized(message.unwrap_or_else(|| {
            "You do not have permission to perform this action".to_string()
        })),
        404 => Error::NotFound {
            resource: context
                .resource
                .clone()
                .unwrap_or_else(|| "Resource".to_string()),
            identifier: context
                .identifier
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        },
        429 => Error::RateLimited {
            retry_after: Duration::from_secs(retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
        },
        500 => Error::Api {
            status,
            message: message.unwrap_or_else(|| "Internal server error".to_string()),
        },
        _ => Error::Api {
            status,
            message: message.unwrap_or_else(|| format!("Unknown error occurred ({status})")),
        },
    }
}

// The panel reports either a top-level `message` or a JSON:API style `errors` array.
fn body_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    body.get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|first| first.get("detail").or_else(|| first.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn field_errors(body: &Value) -> Vec<FieldError> {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return Vec::new();
    };

    errors
        .iter()
        .map(|err| {
            let field = err
                .get("field")
                .or_else(|| err.pointer("/meta/source_field"))
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let detail = err
                .get("detail")
                .or_else(|| err.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Validation failed");
            FieldError::new(field, detail)
        })
        .collect()
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
