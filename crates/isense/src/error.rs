//! Error types for the iSENSE client.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportError;

/// What kind of name a failed lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Field,
    Dataset,
    /// The row array of a dataset.
    Rows,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Field => write!(f, "field"),
            LookupKind::Dataset => write!(f, "dataset"),
            LookupKind::Rows => write!(f, "rows in dataset"),
        }
    }
}

/// Classification of a non-200 response from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    /// 401: the key or email/password was not accepted.
    Unauthorized,
    /// 404: the project (or user) does not exist.
    NotFound,
    /// 422: credentials were fine but the payload was rejected.
    Unprocessable,
    /// Any other status.
    Unknown,
}

impl ServiceErrorKind {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ServiceErrorKind::Unauthorized,
            404 => ServiceErrorKind::NotFound,
            422 => ServiceErrorKind::Unprocessable,
            _ => ServiceErrorKind::Unknown,
        }
    }

    /// Advice to show alongside the failure.
    pub fn hint(&self) -> &'static str {
        match self {
            ServiceErrorKind::Unauthorized => {
                "check that the contributor key or email/password is valid for this project"
            }
            ServiceErrorKind::NotFound => "unable to find that project ID",
            ServiceErrorKind::Unprocessable => {
                "the service rejected the upload; check field names and data formatting"
            }
            ServiceErrorKind::Unknown => "unexpected response from the service",
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceErrorKind::Unauthorized => "unauthorized",
            ServiceErrorKind::NotFound => "not found",
            ServiceErrorKind::Unprocessable => "unprocessable",
            ServiceErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Main error type for iSENSE operations.
///
/// Every variant records the public operation that failed.
#[derive(Debug, Error)]
pub enum IsenseError {
    /// A precondition was not met; nothing was sent.
    #[error("{operation}: {message}")]
    Config {
        operation: &'static str,
        message: String,
    },

    /// A field or dataset name did not match anything in the cached metadata.
    #[error("{operation}: no {kind} named '{name}'")]
    NotResolved {
        operation: &'static str,
        kind: LookupKind,
        name: String,
    },

    /// The transport could not complete the request.
    #[error("{operation}: request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The response body was not the JSON we expected.
    #[error("{operation}: malformed response: {source}")]
    Parse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered with a non-200 status.
    #[error("{operation}: service returned HTTP {status} ({kind})")]
    Service {
        operation: &'static str,
        status: u16,
        kind: ServiceErrorKind,
    },
}

/// Coarse error category, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    NotResolved,
    Transport,
    Parse,
    Service(ServiceErrorKind),
}

/// Terminal state of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Validation or resolution failed before any upload request was made.
    NotSent,
    /// A request went out but did not succeed.
    Rejected,
}

impl IsenseError {
    pub(crate) fn config(operation: &'static str, message: impl Into<String>) -> Self {
        IsenseError::Config {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn not_resolved(
        operation: &'static str,
        kind: LookupKind,
        name: impl Into<String>,
    ) -> Self {
        IsenseError::NotResolved {
            operation,
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn service(operation: &'static str, status: u16) -> Self {
        IsenseError::Service {
            operation,
            status,
            kind: ServiceErrorKind::from_status(status),
        }
    }

    /// Re-attribute an error raised by a helper to the public operation.
    pub(crate) fn in_operation(mut self, op: &'static str) -> Self {
        match &mut self {
            IsenseError::Config { operation, .. }
            | IsenseError::NotResolved { operation, .. }
            | IsenseError::Transport { operation, .. }
            | IsenseError::Parse { operation, .. }
            | IsenseError::Service { operation, .. } => *operation = op,
        }
        self
    }

    /// The public operation that produced this error.
    pub fn operation(&self) -> &'static str {
        match self {
            IsenseError::Config { operation, .. }
            | IsenseError::NotResolved { operation, .. }
            | IsenseError::Transport { operation, .. }
            | IsenseError::Parse { operation, .. }
            | IsenseError::Service { operation, .. } => operation,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IsenseError::Config { .. } => ErrorKind::Config,
            IsenseError::NotResolved { .. } => ErrorKind::NotResolved,
            IsenseError::Transport { .. } => ErrorKind::Transport,
            IsenseError::Parse { .. } => ErrorKind::Parse,
            IsenseError::Service { kind, .. } => ErrorKind::Service(*kind),
        }
    }

    /// HTTP status of the failed response, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            IsenseError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            IsenseError::Config { .. } | IsenseError::NotResolved { .. } => Outcome::NotSent,
            IsenseError::Transport { .. }
            | IsenseError::Parse { .. }
            | IsenseError::Service { .. } => Outcome::Rejected,
        }
    }

    /// Snapshot this error as a cloneable diagnostic.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic {
            operation: self.operation(),
            kind: self.kind(),
            status: self.status(),
            message: self.to_string(),
        }
    }
}

/// Record of the most recent failure, kept by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub operation: &'static str,
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

/// Result type alias for iSENSE operations.
pub type Result<T> = std::result::Result<T, IsenseError>;
