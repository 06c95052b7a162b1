//! The transport boundary consumed by `Api`.
//!
//! # Design
//! `Sender` performs exactly one request/response exchange. It owns every
//! transport concern: base URL, credentials, status classification,
//! timeouts and cancellation. The core only sees "bytes" or "error".

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::http::HttpRequest;

/// One HTTP-like request/response exchange.
///
/// Implementations must fail with `ApiError::Cancelled` when `ctx` is
/// cancelled before or during the call, and must be safe to share between
/// threads.
pub trait Sender: Send + Sync {
    fn send(&self, ctx: &CancellationToken, request: &HttpRequest) -> Result<Vec<u8>, ApiError>;
}

impl<S: Sender + ?Sized> Sender for &S {
    fn send(&self, ctx: &CancellationToken, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        (**self).send(ctx, request)
    }
}

impl<S: Sender + ?Sized> Sender for Arc<S> {
    fn send(&self, ctx: &CancellationToken, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        (**self).send(ctx, request)
    }
}

impl<S: Sender + ?Sized> Sender for Box<S> {
    fn send(&self, ctx: &CancellationToken, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        (**self).send(ctx, request)
    }
}

/// A scripted `Sender` for tests.
///
/// Every call is recorded as `"{METHOD} {path} {body}"` (trimmed) and
/// answered with the next queued response. An empty queue yields
/// `ApiError::NoResponse`.
#[derive(Debug, Default)]
pub struct FakeSender {
    calls: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Result<Vec<u8>, ApiError>>>,
}

impl FakeSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response carrying `data`.
    pub fn push_data(&self, data: impl Into<Vec<u8>>) {
        self.push(Ok(data.into()));
    }

    /// Queue a failed response.
    pub fn push_error(&self, err: ApiError) {
        self.push(Err(err));
    }

    pub fn push(&self, response: Result<Vec<u8>, ApiError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn pending_responses(&self) -> usize {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Sender for FakeSender {
    fn send(&self, ctx: &CancellationToken, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        let call = format!(
            "{} {} {}",
            request.method,
            request.path,
            request.body.as_deref().unwrap_or("")
        );
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.trim().to_string());

        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::NoResponse {
                    method: request.method,
                    path: request.path.clone(),
                })
            })
    }
}
