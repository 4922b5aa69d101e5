//! Error taxonomy and classification
//!
//! Every failure in the upload pipeline is normalized into a
//! [`ClassifiedError`] before it crosses a component boundary. The classifier
//! maps raw backend failures onto a small taxonomy with a retryability flag
//! and a user-safe message; raw backend text is logged but never surfaced to
//! the caller.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Failure taxonomy for the upload pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller's fault (bad type, oversized file); never retried
    Validation,
    /// Object-storage backend fault
    Storage,
    /// Catalog (relational) backend fault
    Database,
    /// Transport-level fault (timeouts, connection resets, 5xx)
    Network,
    /// Anything that matched no known pattern
    Unknown,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Storage => write!(f, "storage"),
            ErrorKind::Database => write!(f, "database"),
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A normalized failure: taxonomy kind, user-safe message, retryability.
///
/// The message is a curated rewrite suitable for end users; internal detail
/// stays in the tracing logs at the point of classification.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    /// A caller-correctable validation failure. Never retryable; the message
    /// is surfaced verbatim, so it must already be user-safe.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message, false)
    }
}

/// Which layer produced a raw failure. Drives classification priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    /// Object-storage backend, with the transport status when one exists
    Storage { status: Option<u16> },
    /// Relational catalog backend
    Database,
    /// Bare transport failure carrying only an HTTP status
    Transport { status: u16 },
    /// Origin unknown
    Unknown,
}

/// Classify a raw failure into the pipeline taxonomy.
///
/// More specific, permanently-failing conditions (missing resource, denied
/// access, oversized payload) are detected before the broad retryable
/// buckets so that retry budget is never spent on operations that cannot
/// succeed. The match order is load-bearing.
pub fn classify(source: ErrorSource, raw_message: &str) -> ClassifiedError {
    let lower = raw_message.to_lowercase();
    let is_storage = matches!(source, ErrorSource::Storage { .. });
    let storage_status = match source {
        ErrorSource::Storage { status } => status,
        _ => None,
    };

    if is_storage
        && (storage_status == Some(404)
            || lower.contains("not found")
            || lower.contains("does not exist"))
    {
        tracing::warn!(raw = %raw_message, "Storage resource missing");
        return ClassifiedError::new(
            ErrorKind::Storage,
            "The storage destination could not be found. Please contact an administrator.",
            false,
        );
    }

    if is_storage
        && (matches!(storage_status, Some(401 | 403))
            || lower.contains("permission")
            || lower.contains("unauthorized"))
    {
        tracing::warn!(raw = %raw_message, "Storage access denied");
        return ClassifiedError::new(
            ErrorKind::Storage,
            "Storage access was denied. Please contact an administrator.",
            false,
        );
    }

    if lower.contains("too large") || lower.contains("size") {
        return ClassifiedError::new(
            ErrorKind::Validation,
            "The file is too large for this destination.",
            false,
        );
    }

    if is_storage {
        tracing::warn!(raw = %raw_message, "Transient storage failure");
        return ClassifiedError::new(
            ErrorKind::Storage,
            "The storage service is temporarily unavailable. Please try again.",
            true,
        );
    }

    if matches!(source, ErrorSource::Database)
        || lower.contains("database")
        || lower.contains("relation")
        || lower.contains("column")
    {
        tracing::warn!(raw = %raw_message, "Transient database failure");
        return ClassifiedError::new(
            ErrorKind::Database,
            "The catalog is temporarily unavailable. Please try again.",
            true,
        );
    }

    if lower.contains("network")
        || lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection")
    {
        return ClassifiedError::new(
            ErrorKind::Network,
            "A network problem interrupted the upload. Please try again.",
            true,
        );
    }

    if let ErrorSource::Transport { status } = source {
        if (400..500).contains(&status) {
            let retryable = status == 429;
            let message = if retryable {
                "The service is receiving too many requests. Please try again shortly."
            } else {
                "The upload request was rejected. Please check the file and try again."
            };
            return ClassifiedError::new(ErrorKind::Validation, message, retryable);
        }
        if status >= 500 {
            return ClassifiedError::new(
                ErrorKind::Network,
                "The service is temporarily unavailable. Please try again.",
                true,
            );
        }
    }

    tracing::warn!(raw = %raw_message, "Unclassified failure");
    ClassifiedError::new(
        ErrorKind::Unknown,
        "Something went wrong during the upload. Please try again.",
        true,
    )
}
