//! Error handling utilities for the motivatebot application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use std::path::PathBuf;
use thiserror::Error;

/// Represents specific error cases that can occur when talking to the hosted
/// assistant service.
///
/// Every variant here is a remote-call failure. The chat loop catches these at
/// the turn boundary, so none of them ends a session on its own.
///
/// # Examples
///
/// ```
/// use motivatebot::errors::AIError;
///
/// let error = AIError::RunFailed {
///     run_id: "run_123".to_string(),
///     status: "expired".to_string(),
/// };
/// assert!(format!("{}", error).contains("run_123"));
/// assert!(format!("{}", error).contains("expired"));
/// ```
#[derive(Debug, Error)]
pub enum AIError {
    /// The HTTP request itself failed (DNS, connection refused, TLS, ...).
    #[error("Assistant service request failed: {0}. Check your network connection and OPENAI_BASE_URL.")]
    Http(#[source] reqwest::Error),

    /// The service rejected the API key.
    #[error("Assistant service rejected the API key. Check OPENAI_API_KEY in your environment or .env file.")]
    Unauthorized,

    /// The service answered with a non-success status.
    #[error("Assistant service returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid response from assistant service: {0}")]
    InvalidResponse(String),

    /// A run reached a terminal state other than `completed`.
    #[error("Assistant run {run_id} ended with status '{status}'")]
    RunFailed {
        /// Identifier of the run
        run_id: String,
        /// Terminal status reported by the service
        status: String,
    },

    /// A run did not complete within the configured timeout.
    #[error("Assistant run {run_id} did not complete within {waited_secs}s")]
    RunTimeout {
        /// Identifier of the run
        run_id: String,
        /// Seconds waited before giving up
        waited_secs: u64,
    },

    /// Waiting was cancelled by the caller.
    #[error("Waiting for assistant run {0} was cancelled")]
    Cancelled(String),
}

/// Represents errors in profile templates and user identities.
///
/// # Examples
///
/// ```
/// use motivatebot::errors::ProfileError;
///
/// let error = ProfileError::InvalidUserName("../etc".to_string());
/// assert!(format!("{}", error).contains("../etc"));
/// ```
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The user name cannot be turned into a safe storage path.
    #[error("Invalid user name '{0}'. Use a non-empty name without path separators or leading dots.")]
    InvalidUserName(String),

    /// The template file is missing a required section or has the wrong shape.
    #[error("Malformed profile template {path}: {reason}")]
    MalformedTemplate {
        /// Path of the template file
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// A stored profile could not be read back.
    #[error("Malformed profile for user '{user}': {reason}")]
    MalformedProfile {
        /// Owner of the profile
        user: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Represents all possible errors that can occur in the motivatebot application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use motivatebot::errors::AppError;
///
/// let error = AppError::Config("OPENAI_API_KEY is not set".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: OPENAI_API_KEY is not set");
/// ```
///
/// Converting from an IO error:
/// ```
/// use motivatebot::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding errors for profiles, templates and logs.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors in profile templates or user identities.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Errors related to the hosted assistant service.
    #[error("AI error: {0}")]
    AI(#[from] AIError),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use motivatebot::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Config("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let app_io_error = AppError::Io(io_error);
        assert_eq!(format!("{}", app_io_error), "I/O error: permission denied");

        let ai_error = AppError::AI(AIError::Api {
            status: 429,
            message: "Rate limit reached".to_string(),
        });
        assert_eq!(
            format!("{}", ai_error),
            "AI error: Assistant service returned HTTP 429: Rate limit reached"
        );
    }

    #[test]
    fn test_ai_error_variants() {
        let error = AIError::RunTimeout {
            run_id: "run_1".to_string(),
            waited_secs: 120,
        };
        assert!(format!("{}", error).contains("run_1"));
        assert!(format!("{}", error).contains("120s"));

        let error = AIError::Cancelled("run_2".to_string());
        assert!(format!("{}", error).contains("cancelled"));

        let error = AIError::Unauthorized;
        assert!(format!("{}", error).contains("OPENAI_API_KEY"));

        let error = AIError::InvalidResponse("missing id".to_string());
        assert!(format!("{}", error).contains("missing id"));
    }

    #[test]
    fn test_profile_error_conversion_to_app_error() {
        let error = ProfileError::MalformedTemplate {
            path: PathBuf::from("users/blank_profile.json"),
            reason: "missing 'personal_info'".to_string(),
        };
        let app_error: AppError = error.into();

        assert!(format!("{}", app_error).starts_with("Profile error:"));
        assert!(format!("{}", app_error).contains("blank_profile.json"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app_error: AppError = parse_error.into();
        assert!(matches!(app_error, AppError::Json(_)));
        assert!(format!("{}", app_error).starts_with("JSON error:"));
    }

    #[test]
    fn test_result_combinators() {
        let io_result: Result<(), io::Error> = Err(io::Error::other("test error"));
        let app_result: AppResult<()> = io_result.map_err(AppError::Io);

        match app_result {
            Err(AppError::Io(inner)) => {
                assert_eq!(inner.kind(), io::ErrorKind::Other);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }
}
