//! Error types for Helpdesk
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Generic text shown to the user when a request cannot be served
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, I was unable to process your request. Please try again.";

/// Text shown when the model's ticket output could not be parsed
pub const MALFORMED_TICKET_MESSAGE: &str =
    "I could not create a ticket from that request. Could you please rephrase the issue with a little more detail?";

/// Main error type for Helpdesk operations
///
/// This enum covers configuration loading, completion provider calls,
/// context retrieval, ticket parsing and ticket persistence.
#[derive(Error, Debug)]
pub enum HelpdeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Completion provider errors (API calls, invalid responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Context retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Ticket store read or write failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// The ticket store could not be reached at startup
    #[error("Store connection failed: {0}")]
    StoreConnection(String),

    /// Model output did not follow the ticket line format
    #[error("Malformed ticket: {0}")]
    MalformedTicket(String),

    /// A message recipient is not present in the contact book
    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    /// An external call did not complete in time
    #[error("{operation} timed out after {seconds} seconds")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Configured limit in seconds
        seconds: u64,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedded database errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
}

impl HelpdeskError {
    /// Returns true when retrying the same operation may succeed
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::error::HelpdeskError;
    ///
    /// let timeout = HelpdeskError::Timeout { operation: "completion".into(), seconds: 60 };
    /// assert!(timeout.is_retryable());
    /// assert!(!HelpdeskError::MalformedTicket("2 lines".into()).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Provider(_)
                | Self::Retrieval(_)
                | Self::Storage(_)
                | Self::Http(_)
        )
    }

    /// User-facing text for this error
    ///
    /// Never includes internal details; those belong in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedTicket(_) => MALFORMED_TICKET_MESSAGE.to_string(),
            Self::ContactNotFound(name) => format!(
                "I couldn't find a contact named {} in your contact book.",
                name
            ),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for Helpdesk operations
///
/// Uses `anyhow::Error` so callers can attach context; typed failures are
/// recovered with `downcast_ref::<HelpdeskError>()`.
pub type Result<T> = anyhow::Result<T>;

/// Await `future`, failing with `HelpdeskError::Timeout` after `seconds`
///
/// # Examples
///
/// ```
/// use helpdesk::error::with_timeout;
///
/// # async fn example() -> helpdesk::error::Result<()> {
/// let value = with_timeout("lookup", 5, async { Ok(42) }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<T, F>(operation: &str, seconds: u64, future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    tokio::time::timeout(std::time::Duration::from_secs(seconds), future)
        .await
        .map_err(|_| {
            tracing::warn!("{} timed out after {} seconds", operation, seconds);
            HelpdeskError::Timeout {
                operation: operation.to_string(),
                seconds,
            }
        })?
}
