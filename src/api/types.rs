//! Response envelope types

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Envelope wrapping every API response.
///
/// Exactly one of `data` and `error` is meaningful; an error code of zero
/// means no error. Missing or `null` fields decode to their defaults, while
/// anything other than an object at the envelope, `data` or `error` level is
/// rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
pub struct ApiResponse<T> {
    #[serde(default, deserialize_with = "object_or_null")]
    pub data: T,
    #[serde(default, deserialize_with = "object_or_null")]
    pub error: ApiError,
}

impl<T: DeserializeOwned + Default> ApiResponse<T> {
    /// Decode a response body, which must be a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(de::Error::custom(format!(
                "expected a JSON object envelope, found {}",
                kind(&value)
            )));
        }
        serde_json::from_value(value)
    }
}

/// Error descriptor carried in the envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, Value>,
}

impl ApiError {
    pub fn is_error(&self) -> bool {
        self.code != 0
    }
}

/// Account credit totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Credits {
    /// Cumulative credit grant
    #[serde(rename = "total_credits", default, deserialize_with = "null_as_default")]
    pub total: f64,
    /// Cumulative consumption
    #[serde(rename = "total_usage", default, deserialize_with = "null_as_default")]
    pub usage: f64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn object_or_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(T::default()),
        Some(value @ Value::Object(_)) => serde_json::from_value(value).map_err(de::Error::custom),
        Some(other) => Err(de::Error::custom(format!(
            "expected an object, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
