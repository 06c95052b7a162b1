//! Synchronous client core for the Monibot monitoring API.
//!
//! # Overview
//! Reports watchdog heartbeats, machine samples, machine text and metric
//! values, and fetches watchdog, machine and metric descriptors. Request
//! bodies are built and responses parsed without touching the network; a
//! `Sender` performs the actual round trip, which keeps the encoding and
//! decoding rules deterministic and testable against `FakeSender`.
//!
//! # Design
//! - `Api` is stateless: it holds only its `Sender`.
//! - `encoding` and `decoding` are pure functions; `request` builds one
//!   `HttpRequest` per endpoint from them.
//! - `HttpSender` is the production transport (ureq, bearer key, tries).
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod decoding;
pub mod encoding;
pub mod error;
pub mod http;
pub mod request;
pub mod sender;
pub mod transport;
pub mod types;

pub use api::Api;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest};
pub use sender::{FakeSender, Sender};
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpSender, HttpSenderConfig};
pub use types::{Machine, MachineSample, Metric, Watchdog};

/// Library version, sent in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
