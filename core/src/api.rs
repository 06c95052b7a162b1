//! The Monibot resource facade.
//!
//! # Design
//! `Api` holds only its `Sender` and carries no mutable state between calls.
//! Every operation builds one request, performs one `send`, and then either
//! ignores the payload, decodes one object or decodes an array. Sender
//! errors are returned as they are.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::decoding::{decode_list, decode_one};
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::request;
use crate::sender::Sender;
use crate::transport::{HttpSender, HttpSenderConfig};
use crate::types::{Machine, MachineSample, Metric, Watchdog};

/// Typed access to the Monibot API over a `Sender`.
///
/// Safe to share between threads whenever the sender is.
#[derive(Debug, Clone)]
pub struct Api<S> {
    sender: S,
}

impl Api<HttpSender> {
    /// An `Api` talking HTTP to the service described by `config`.
    pub fn from_config(config: HttpSenderConfig) -> Self {
        Self::new(HttpSender::new(config))
    }
}

impl<S: Sender> Api<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    fn call(&self, ctx: &CancellationToken, request: HttpRequest) -> Result<Vec<u8>, ApiError> {
        debug!(method = %request.method, path = %request.path, "monibot request");
        self.sender.send(ctx, &request)
    }

    /// Check that the service is reachable and the API key is accepted.
    pub fn get_ping(&self, ctx: &CancellationToken) -> Result<(), ApiError> {
        self.call(ctx, request::ping())?;
        Ok(())
    }

    pub fn get_watchdogs(&self, ctx: &CancellationToken) -> Result<Vec<Watchdog>, ApiError> {
        let data = self.call(ctx, request::list_watchdogs())?;
        decode_list(&data)
    }

    pub fn get_watchdog(&self, ctx: &CancellationToken, id: &str) -> Result<Watchdog, ApiError> {
        let data = self.call(ctx, request::get_watchdog(id))?;
        decode_one(&data)
    }

    pub fn post_watchdog_heartbeat(
        &self,
        ctx: &CancellationToken,
        id: &str,
    ) -> Result<(), ApiError> {
        self.call(ctx, request::watchdog_heartbeat(id))?;
        Ok(())
    }

    pub fn get_machines(&self, ctx: &CancellationToken) -> Result<Vec<Machine>, ApiError> {
        let data = self.call(ctx, request::list_machines())?;
        decode_list(&data)
    }

    pub fn get_machine(&self, ctx: &CancellationToken, id: &str) -> Result<Machine, ApiError> {
        let data = self.call(ctx, request::get_machine(id))?;
        decode_one(&data)
    }

    pub fn post_machine_sample(
        &self,
        ctx: &CancellationToken,
        id: &str,
        sample: &MachineSample,
    ) -> Result<(), ApiError> {
        self.call(ctx, request::machine_sample(id, sample))?;
        Ok(())
    }

    /// Upload free text (log excerpts, command output) for a machine.
    pub fn post_machine_text(
        &self,
        ctx: &CancellationToken,
        id: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        self.call(ctx, request::machine_text(id, text))?;
        Ok(())
    }

    pub fn get_metrics(&self, ctx: &CancellationToken) -> Result<Vec<Metric>, ApiError> {
        let data = self.call(ctx, request::list_metrics())?;
        decode_list(&data)
    }

    pub fn get_metric(&self, ctx: &CancellationToken, id: &str) -> Result<Metric, ApiError> {
        let data = self.call(ctx, request::get_metric(id))?;
        decode_one(&data)
    }

    /// Increment a counter metric by `value`.
    pub fn post_metric_inc(
        &self,
        ctx: &CancellationToken,
        id: &str,
        value: i64,
    ) -> Result<(), ApiError> {
        self.call(ctx, request::metric_inc(id, value))?;
        Ok(())
    }

    /// Set a gauge metric to `value`.
    pub fn post_metric_set(
        &self,
        ctx: &CancellationToken,
        id: &str,
        value: i64,
    ) -> Result<(), ApiError> {
        self.call(ctx, request::metric_set(id, value))?;
        Ok(())
    }

    /// Submit a batch of histogram values.
    pub fn post_metric_values(
        &self,
        ctx: &CancellationToken,
        id: &str,
        values: &[i64],
    ) -> Result<(), ApiError> {
        self.call(ctx, request::metric_values(id, values))?;
        Ok(())
    }
}
