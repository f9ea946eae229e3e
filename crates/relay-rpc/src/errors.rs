//! JSON-RPC error codes and the wire-format error object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed JSON-RPC 2.0 error taxonomy.
///
/// Each variant is a (code, message) pair from JSON-RPC 2.0 plus the three
/// implementation-defined codes reserved for handlers. The table itself is
/// immutable; per-occurrence diagnostics travel in [`ErrorObject::data`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed JSON at any nesting level (`-32700`).
    ParseError,
    /// Semantic rejection of a well-formed request (`-32600`).
    InvalidRequest,
    /// No handler registered for the method name (`-32601`).
    MethodNotFound,
    /// Well-formed JSON with the wrong type for a known field (`-32602`).
    InvalidParams,
    /// Unclassified decode or server failure (`-32603`).
    InternalError,
    /// Handler-chosen system-level failure (`-32400`).
    SystemError,
    /// Handler-chosen transport-level failure (`-32300`).
    TransportError,
    /// Handler-chosen application/domain failure (`-32500`).
    ApplicationError,
}

impl ErrorCode {
    /// Numeric wire code.
    pub fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::SystemError => -32400,
            Self::TransportError => -32300,
            Self::ApplicationError => -32500,
        }
    }

    /// Canonical wire message.
    pub fn message(self) -> &'static str {
        match self {
            Self::ParseError => "parse error",
            Self::InvalidRequest => "invalid request",
            Self::MethodNotFound => "method not found",
            Self::InvalidParams => "invalid params",
            Self::InternalError => "internal error",
            Self::SystemError => "system error",
            Self::TransportError => "transport error",
            Self::ApplicationError => "application error",
        }
    }
}

/// Wire-format error body inside a [`crate::types::Response`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct ErrorObject {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional per-occurrence diagnostic (e.g. the decoder's own message).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Build an error object from a taxonomy entry, no diagnostic.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_owned(),
            data: None,
        }
    }

    /// Build an error object carrying a diagnostic payload.
    pub fn with_data(code: ErrorCode, data: impl Into<Value>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::new(code)
        }
    }

    /// Build a handler-chosen error with an arbitrary code and message.
    pub fn custom(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

impl From<ErrorCode> for ErrorObject {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

/// Classify a decode failure into the error taxonomy.
///
/// Syntax errors (including truncated input) are parse errors; a type
/// mismatch on a known field is an invalid-params error; anything else is
/// unclassified.
pub fn classify(err: &serde_json::Error) -> ErrorCode {
    use serde_json::error::Category;
    match err.classify() {
        Category::Syntax | Category::Eof => ErrorCode::ParseError,
        Category::Data => ErrorCode::InvalidParams,
        Category::Io => ErrorCode::InternalError,
    }
}
