//! Core error types for Quarry.

use thiserror::Error;

/// Result type alias using `QuarryError`.
pub type QuarryResult<T> = std::result::Result<T, QuarryError>;

/// Generic boxed error for external error sources.
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for Quarry operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuarryError {
    /// Type mismatch or invalid type operation.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid value provided.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Schema-related error (unknown column, mismatched partition arity).
    #[error("SchemaError: {0}")]
    SchemaError(String),

    /// Column not found in a row or schema.
    #[error("ColumnNotFound: {0}")]
    ColumnNotFound(String),

    /// Expression evaluation error.
    #[error("ExecutionError: {0}")]
    ExecutionError(String),

    /// Partition catalog access failed (unreachable, missing table or partition metadata).
    #[error("CatalogError: {message}")]
    CatalogError {
        /// What the catalog call was doing.
        message: String,
        /// Underlying failure reported by the catalog client, if any.
        #[source]
        source: Option<GenericError>,
    },

    /// The query could not be planned.
    #[error("PlanningError: {message}")]
    PlanningError {
        /// Planning step that failed.
        message: String,
        /// Cause of the failure, if it came from a collaborator.
        #[source]
        source: Option<Box<QuarryError>>,
    },

    /// Feature not yet implemented.
    #[error("NotImplemented: {0}")]
    NotImplemented(String),

    /// Internal error (bug in Quarry).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// Out of specification error (metadata doesn't conform to expected format).
    #[error("OutOfSpec: {0}")]
    OutOfSpec(String),
}

impl QuarryError {
    /// Create a new `TypeError`.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new `ValueError`.
    pub fn value_error<S: Into<String>>(msg: S) -> Self {
        Self::ValueError(msg.into())
    }

    /// Create a new `SchemaError`.
    pub fn schema_error<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a new `NotImplemented` error.
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Create an `OutOfSpec` error for malformed metadata.
    pub fn oos<S: Into<String>>(msg: S) -> Self {
        Self::OutOfSpec(msg.into())
    }

    /// Create a new `ExecutionError`.
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a catalog access error without an underlying cause.
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        Self::CatalogError {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a catalog access error wrapping the client's failure.
    pub fn catalog_with_source<S, E>(msg: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<GenericError>,
    {
        Self::CatalogError {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    /// Create a planning error.
    pub fn planning<S: Into<String>>(msg: S) -> Self {
        Self::PlanningError {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a planning error caused by another failure.
    pub fn planning_failed<S: Into<String>>(msg: S, cause: QuarryError) -> Self {
        Self::PlanningError {
            message: msg.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Whether this error (or its planning cause) came from the catalog.
    pub fn is_catalog_error(&self) -> bool {
        match self {
            Self::CatalogError { .. } => true,
            Self::PlanningError {
                source: Some(cause),
                ..
            } => cause.is_catalog_error(),
            _ => false,
        }
    }
}

/// Ensure a condition holds, returning an `ExecutionError` if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::QuarryError::ExecutionError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::QuarryError::$variant(format!($($msg)*)));
        }
    };
}
