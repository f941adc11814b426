//! Unified error type for docforge.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in docforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested file could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "upload", "processed file").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("{0}")]
    Validation(String),

    /// The file category or conversion pair is not supported.
    #[error("{0}")]
    Unsupported(String),

    /// The request body exceeded the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (soffice, gs) failed, timed out, or is missing.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// A conversion or compression step failed.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Unsupported(_) => 400,
            Error::PayloadTooLarge(_) => 413,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 500,
            Error::Conversion(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation_error",
            Error::Unsupported(_) => "unsupported",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::Io { .. } => "io_error",
            Error::Tool { .. } => "tool_error",
            Error::Conversion(_) => "conversion_failed",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for an unsupported conversion pair.
    pub fn unsupported_pair(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Error::Unsupported(format!("Conversion from {from} to {to} not supported"))
    }

    /// Fold a failure raised while converting into [`Error::Conversion`].
    ///
    /// Client-side errors (validation, unsupported pairs, missing files) keep
    /// their own variant so they still map to a 4xx status.
    pub fn into_conversion(self) -> Self {
        match self {
            Error::NotFound { .. }
            | Error::Validation(_)
            | Error::Unsupported(_)
            | Error::PayloadTooLarge(_)
            | Error::Conversion(_) => self,
            other => Error::Conversion(other.to_string()),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
