//! Error types
//!
//! Two channels are kept apart:
//! - query errors come from `fetch_all` and are also recorded in the store
//! - command errors come from create/update/remove and are only returned
//!   to the caller

use thiserror::Error;

/// Failure talking to the remote collection
///
/// Transport failures, timeouts and non-2xx responses all end up here. The
/// engine treats every variant the same way; callers that care about the
/// difference can match on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Every remote failure can be retried later
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            RemoteError::Request(_) => {
                Some("Check that the todo server is running and base_url is correct.")
            }
            RemoteError::Status { status, .. } if *status >= 500 => {
                Some("The server failed to handle the request. Try again later.")
            }
            RemoteError::Decode(_) => {
                Some("The server response did not look like a todo. Check base_url points at the todo API.")
            }
            _ => None,
        }
    }
}

/// Input rejected before any network call
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Todo text must not be empty")]
    EmptyText,

    #[error("A category must be selected")]
    MissingCategory,

    #[error("Nothing to update")]
    EmptyPatch,
}

/// Failure of a single mutating operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl CommandError {
    /// True if the command was rejected locally without touching the network
    pub fn is_validation(&self) -> bool {
        matches!(self, CommandError::Validation(_))
    }

    /// The underlying remote failure, if any
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            CommandError::Remote(e) => Some(e),
            CommandError::Validation(_) => None,
        }
    }
}

/// Result type for remote calls
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Result type for mutating engine operations
pub type CommandResult<T> = Result<T, CommandError>;
