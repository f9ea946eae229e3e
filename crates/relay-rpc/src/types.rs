//! JSON-RPC wire-format request and response types.
//!
//! `params` stays un-decoded (`RawValue`) until the matched handler asks for
//! its expected shape; a bad `params` payload is the handler's failure, not
//! the envelope's.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::errors::{ErrorCode, ErrorObject};

/// Protocol version marker that always reads and writes the string `"2.0"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Version;

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("2.0")
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "2.0" {
            Ok(Self)
        } else {
            Err(serde::de::Error::custom(format!(
                "unsupported jsonrpc version {s:?}"
            )))
        }
    }
}

/// Incoming RPC request envelope.
///
/// All fields are optional on the wire: a missing `id` correlates as the
/// empty string, and a missing `method` is a valid-but-unroutable name that
/// resolves to a method-not-found error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Request {
    /// Request identifier, echoed back in the response.
    #[serde(default)]
    pub id: String,
    /// Method name to invoke.
    #[serde(default)]
    pub method: String,
    /// Opaque parameter payload, decoded on demand by the handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Box<RawValue>>,
}

impl Request {
    /// Build a request with serialized params.
    pub fn new<T: Serialize>(
        id: impl Into<String>,
        method: impl Into<String>,
        params: &T,
    ) -> Result<Self, ErrorObject> {
        let mut request = Self {
            id: id.into(),
            method: method.into(),
            params: None,
        };
        request.set_params(params)?;
        Ok(request)
    }

    /// Decode `params` into the handler's expected shape.
    ///
    /// Absent params decode as JSON `null`, so handlers taking `Option<T>`
    /// see `None`. Any failure is an invalid-params error carrying the
    /// decoder's message.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, ErrorObject> {
        let raw = self.params.as_deref().map_or("null", RawValue::get);
        serde_json::from_str(raw)
            .map_err(|e| ErrorObject::with_data(ErrorCode::InvalidParams, e.to_string()))
    }

    /// Serialize a value into the `params` slot.
    pub fn set_params<T: Serialize>(&mut self, value: &T) -> Result<(), ErrorObject> {
        let raw = serde_json::to_string(value)
            .and_then(RawValue::from_string)
            .map_err(|e| ErrorObject::with_data(ErrorCode::InternalError, e.to_string()))?;
        self.params = Some(raw);
        Ok(())
    }
}

/// Outgoing RPC response envelope.
///
/// Exactly zero or one of `result`/`error` is present; `id` and `jsonrpc`
/// are always written.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Response {
    /// Echoed request identifier, empty when none could be extracted.
    pub id: String,
    /// Error payload (mutually exclusive with `result`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    /// Result payload (mutually exclusive with `error`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Protocol version marker (`"2.0"`).
    pub jsonrpc: Version,
}

impl Response {
    /// Build a success response.
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            error: None,
            result: Some(result),
            jsonrpc: Version,
        }
    }

    /// Build an error response.
    pub fn error(id: impl Into<String>, error: ErrorObject) -> Self {
        Self {
            id: id.into(),
            error: Some(error),
            result: None,
            jsonrpc: Version,
        }
    }
}
