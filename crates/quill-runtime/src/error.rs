//! Engine errors and protected-call status codes

use crate::value::Value;
use thiserror::Error;

/// Result alias used by every fallible engine operation
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the execution engine and its host API.
///
/// Everything except [`EngineError::Thrown`] is an engine-originated error whose
/// message is the `Display` text. `Thrown` carries an arbitrary value raised by a
/// callable; a protected call hands that value back unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("TypeError: invalid args")]
    InvalidArgs,

    #[error("RangeError: invalid stack index {index}")]
    InvalidIndex { index: isize },

    #[error("TypeError: unexpected type: expected {expected}, got {actual}")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("TypeError: {msg}")]
    TypeError { msg: String },

    #[error("RangeError: {msg}")]
    RangeError { msg: String },

    #[error("{0}")]
    Thrown(Value),

    #[error("InternalError: {msg}")]
    Internal { msg: String },
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgs,
    UnexpectedType,
    Type,
    Range,
    Thrown,
    Internal,
}

impl EngineError {
    pub fn type_error(msg: impl Into<String>) -> Self {
        EngineError::TypeError { msg: msg.into() }
    }

    pub fn range_error(msg: impl Into<String>) -> Self {
        EngineError::RangeError { msg: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal { msg: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidArgs => ErrorKind::InvalidArgs,
            EngineError::UnexpectedType { .. } => ErrorKind::UnexpectedType,
            EngineError::TypeError { .. } => ErrorKind::Type,
            EngineError::InvalidIndex { .. } | EngineError::RangeError { .. } => ErrorKind::Range,
            EngineError::Thrown(_) => ErrorKind::Thrown,
            EngineError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The value a protected call leaves on the stack for this error.
    ///
    /// Thrown values pass through untouched; engine errors become their message.
    pub fn to_value(&self) -> Value {
        match self {
            EngineError::Thrown(value) => value.clone(),
            other => Value::string(other.to_string()),
        }
    }
}

/// Outcome of a protected call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Error,
}

impl CallStatus {
    /// Numeric status code (0 = success, 1 = error)
    pub fn code(self) -> i32 {
        match self {
            CallStatus::Success => 0,
            CallStatus::Error => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == CallStatus::Success
    }
}
