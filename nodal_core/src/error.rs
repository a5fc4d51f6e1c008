//! Error types for nodal_core.

use crate::engine::{Fault, FaultCode};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using nodal_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of failures raised by the node layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Opening, creating or closing an engine resource failed.
    Resource,
    /// Link creation, deletion, move or query failed.
    Link,
    /// A path did not resolve to an existing object.
    ObjectNotFound,
    /// The engine reported an error sentinel instead of a link type.
    InvalidLinkType,
}

impl ErrorKind {
    /// Get the string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Resource => "resource",
            ErrorKind::Link => "link",
            ErrorKind::ObjectNotFound => "object_not_found",
            ErrorKind::InvalidLinkType => "invalid_link_type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during node operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An engine resource could not be opened, created, written or closed.
    #[error("Resource error: {message}")]
    Resource { message: String },

    /// A link operation failed.
    #[error("Link error: {message}")]
    Link { message: String },

    /// Open-by-path failed because nothing exists at the path.
    #[error("Object not found: {message}")]
    ObjectNotFound { message: String },

    /// The engine returned the error sentinel for a link type.
    #[error("Invalid link type: {message}")]
    InvalidLinkType { message: String },

    /// I/O error while reading or writing a container image.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Container image is malformed or has an unsupported version.
    #[error("Invalid image at {path}: {reason}")]
    Image { path: PathBuf, reason: String },

    /// JSON encoding or decoding of a container image failed.
    #[error("Image encoding error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Build a typed failure of the given kind.
    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Resource => Error::Resource { message },
            ErrorKind::Link => Error::Link { message },
            ErrorKind::ObjectNotFound => Error::ObjectNotFound { message },
            ErrorKind::InvalidLinkType => Error::InvalidLinkType { message },
        }
    }

    /// Classify this error. Image persistence failures count as resource errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Resource { .. } | Error::Io { .. } | Error::Image { .. } | Error::Json { .. } => {
                ErrorKind::Resource
            }
            Error::Link { .. } => ErrorKind::Link,
            Error::ObjectNotFound { .. } => ErrorKind::ObjectNotFound,
            Error::InvalidLinkType { .. } => ErrorKind::InvalidLinkType,
        }
    }

    /// Create a Resource error.
    pub fn resource(message: impl Into<String>) -> Self {
        Error::fail(ErrorKind::Resource, message)
    }

    /// Create a Link error.
    pub fn link(message: impl Into<String>) -> Self {
        Error::fail(ErrorKind::Link, message)
    }

    /// Create an Image error.
    pub fn image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Image {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Translate an engine fault raised by a call described by `context`.
    pub(crate) fn from_fault(kind: ErrorKind, context: impl fmt::Display, fault: Fault) -> Self {
        Error::fail(kind, format!("{}: {}", context, fault))
    }

    /// Translate a fault from an open-by-path call.
    ///
    /// A `NotFound` fault becomes `ObjectNotFound`, anything else is a
    /// resource error.
    pub(crate) fn from_open_fault(context: impl fmt::Display, fault: Fault) -> Self {
        let kind = match fault.code {
            FaultCode::NotFound => ErrorKind::ObjectNotFound,
            _ => ErrorKind::Resource,
        };
        Error::from_fault(kind, context, fault)
    }
}

// Additional From implementations for external error types

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}
