//! Error types for the Monibot API client.
//!
//! # Design
//! A single enum covers every way a facade call can fail. Transport-level
//! variants are produced by a `Sender` and reach the caller unchanged; the
//! core itself only ever adds `DeserializationError`. `Transport` displays
//! the sender's message verbatim so nothing gets hidden behind a prefix.

use thiserror::Error;

use crate::http::HttpMethod;

/// Errors returned by `Api` operations and `Sender` implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, I/O).
    #[error("{0}")]
    Transport(String),

    /// The server returned 404 for the requested resource.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The caller's cancellation token fired before or during the request.
    #[error("request cancelled")]
    Cancelled,

    /// No response was available for the request. Raised by test doubles.
    #[error("no response for {method} {path}")]
    NoResponse { method: HttpMethod, path: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}
