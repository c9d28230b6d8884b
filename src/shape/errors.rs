//! Shape error types
//!
//! Error codes:
//! - SHAPE_UNKNOWN_FIELD (REJECT)
//! - SHAPE_MISSING_FIELD (REJECT)
//! - SHAPE_TYPE_MISMATCH (REJECT)
//! - SHAPE_DUPLICATE_FIELD (REJECT)
//! - SHAPE_INVALID_SIGNATURE (REJECT)
//! - SHAPE_PARAMETER_OUT_OF_RANGE (REJECT)
//! - SHAPE_ARITY_MISMATCH (REJECT)
//! - SHAPE_EXISTS (REJECT)
//! - SHAPE_INVALID_NAME (REJECT)
//! - SHAPE_MALFORMED (FATAL)

use std::fmt;

use thiserror::Error;

/// Severity levels for shape errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller input rejected
    Reject,
    /// Shape definitions on disk are unusable
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Stable error codes, one per `ShapeError` variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeErrorCode {
    UnknownField,
    MissingField,
    TypeMismatch,
    DuplicateField,
    InvalidSignature,
    ParameterOutOfRange,
    ArityMismatch,
    ShapeExists,
    InvalidName,
    MalformedShape,
}

impl ShapeErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ShapeErrorCode::UnknownField => "SHAPE_UNKNOWN_FIELD",
            ShapeErrorCode::MissingField => "SHAPE_MISSING_FIELD",
            ShapeErrorCode::TypeMismatch => "SHAPE_TYPE_MISMATCH",
            ShapeErrorCode::DuplicateField => "SHAPE_DUPLICATE_FIELD",
            ShapeErrorCode::InvalidSignature => "SHAPE_INVALID_SIGNATURE",
            ShapeErrorCode::ParameterOutOfRange => "SHAPE_PARAMETER_OUT_OF_RANGE",
            ShapeErrorCode::ArityMismatch => "SHAPE_ARITY_MISMATCH",
            ShapeErrorCode::ShapeExists => "SHAPE_EXISTS",
            ShapeErrorCode::InvalidName => "SHAPE_INVALID_NAME",
            ShapeErrorCode::MalformedShape => "SHAPE_MALFORMED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ShapeErrorCode::MalformedShape => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ShapeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by shape derivation, validation and loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// A referenced field name is absent from the shape
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// A required field is absent from an instance
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A value's type tag disagrees with the declared one
    #[error("field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// A field or parameter name is declared twice
    #[error("duplicate field '{field}'")]
    DuplicateField { field: String },

    #[error("invalid signature: {reason}")]
    InvalidSignature { reason: String },

    #[error("parameter index {index} out of range for {count} parameter(s)")]
    ParameterOutOfRange { index: usize, count: usize },

    #[error("expected {expected} argument(s), got {actual}")]
    ArityMismatch { expected: String, actual: usize },

    #[error("shape '{name}' already exists")]
    ShapeExists { name: String },

    /// A shape name that cannot be used as a file name
    #[error("invalid shape name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("malformed shape file '{path}': {reason}")]
    MalformedShape { path: String, reason: String },
}

impl ShapeError {
    pub fn unknown_field(field: impl Into<String>) -> Self {
        ShapeError::UnknownField {
            field: field.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        ShapeError::MissingField {
            field: field.into(),
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ShapeError::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn duplicate_field(field: impl Into<String>) -> Self {
        ShapeError::DuplicateField {
            field: field.into(),
        }
    }

    pub fn invalid_signature(reason: impl Into<String>) -> Self {
        ShapeError::InvalidSignature {
            reason: reason.into(),
        }
    }

    pub fn shape_exists(name: impl Into<String>) -> Self {
        ShapeError::ShapeExists { name: name.into() }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ShapeError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ShapeError::MalformedShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ShapeErrorCode {
        match self {
            ShapeError::UnknownField { .. } => ShapeErrorCode::UnknownField,
            ShapeError::MissingField { .. } => ShapeErrorCode::MissingField,
            ShapeError::TypeMismatch { .. } => ShapeErrorCode::TypeMismatch,
            ShapeError::DuplicateField { .. } => ShapeErrorCode::DuplicateField,
            ShapeError::InvalidSignature { .. } => ShapeErrorCode::InvalidSignature,
            ShapeError::ParameterOutOfRange { .. } => ShapeErrorCode::ParameterOutOfRange,
            ShapeError::ArityMismatch { .. } => ShapeErrorCode::ArityMismatch,
            ShapeError::ShapeExists { .. } => ShapeErrorCode::ShapeExists,
            ShapeError::InvalidName { .. } => ShapeErrorCode::InvalidName,
            ShapeError::MalformedShape { .. } => ShapeErrorCode::MalformedShape,
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code().severity()
    }

    /// Returns the offending field path, for field-level errors
    pub fn field(&self) -> Option<&str> {
        match self {
            ShapeError::UnknownField { field }
            | ShapeError::MissingField { field }
            | ShapeError::TypeMismatch { field, .. }
            | ShapeError::DuplicateField { field } => Some(field.as_str()),
            _ => None,
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Result type for shape operations
pub type ShapeResult<T> = Result<T, ShapeError>;
