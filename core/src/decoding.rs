//! JSON decoding of response payloads.

use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Decode a payload holding a single JSON object.
pub fn decode_one<T: DeserializeOwned>(data: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(data).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Decode a payload holding a JSON array of objects, preserving order.
/// A `null` payload is an empty list.
pub fn decode_list<T: DeserializeOwned>(data: &[u8]) -> Result<Vec<T>, ApiError> {
    serde_json::from_slice::<Option<Vec<T>>>(data)
        .map(Option::unwrap_or_default)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}
