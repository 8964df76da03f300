//! Response envelope
//!
//! The backend wraps every payload as `{success, data?, error?}`. Older
//! endpoints put the payload at the top level instead (`{success, user}`,
//! `{success, links, count}`); both are folded into one enum here so callers
//! only ever see `Success` or `Failure`.

use serde::de::{DeserializeOwned, Error as DeError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { data: Option<T> },
    Failure { error: String },
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse::Success { data: Some(data) }
    }

    pub fn empty() -> Self {
        ApiResponse::Success { data: None }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        ApiResponse::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// Convert into the payload, mapping `Failure` to an API error with `status`
    pub fn into_result(self, status: u16) -> Result<Option<T>, ClientError> {
        match self {
            ApiResponse::Success { data } => Ok(data),
            ApiResponse::Failure { error } => Err(ClientError::api(status, error)),
        }
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Payload carried at the top level by legacy responses
fn fold_legacy<T: DeserializeOwned>(mut rest: Map<String, Value>) -> Option<T> {
    rest.remove("message");
    rest.remove("statusCode");
    if rest.is_empty() {
        return None;
    }
    if rest.len() == 1 {
        let value = rest.values().next().cloned().unwrap_or(Value::Null);
        if let Ok(data) = serde_json::from_value(value) {
            return Some(data);
        }
    }
    serde_json::from_value(Value::Object(rest)).ok()
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ApiResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireEnvelope::deserialize(deserializer)?;
        let message = wire
            .rest
            .get("message")
            .and_then(Value::as_str)
            .map(String::from);

        let success = wire.success.unwrap_or(wire.error.is_none());
        if !success {
            let error = wire
                .error
                .or(message)
                .unwrap_or_else(|| "Request failed".to_string());
            return Ok(ApiResponse::Failure { error });
        }

        let data = match wire.data {
            Some(Value::Null) | None => fold_legacy(wire.rest),
            Some(value) => Some(serde_json::from_value(value).map_err(D::Error::custom)?),
        };
        Ok(ApiResponse::Success { data })
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            ApiResponse::Success { data } => {
                map.serialize_entry("success", &true)?;
                if let Some(data) = data {
                    map.serialize_entry("data", data)?;
                }
            }
            ApiResponse::Failure { error } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}
