//! Blocking HTTP `Sender` for the Monibot service.
//!
//! # Design
//! `HttpSender` turns an `HttpRequest` into a real HTTP exchange with `ureq`.
//! It owns everything the core leaves out: the base URL, the bearer API key,
//! the user agent, the timeout, status classification and a bounded number
//! of tries. A try is repeated only after a transport failure, a 429 or a
//! 5xx. Cancellation is checked before and after every try and while waiting
//! between tries; an in-flight request is bounded by the timeout.

use std::thread;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::sender::Sender;

pub const DEFAULT_BASE_URL: &str = "https://monibot.io";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Granularity of cancellation checks while waiting between tries.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Connection settings for `HttpSender`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSenderConfig {
    /// Service root, without the `/api` suffix.
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    /// Upper bound for one try, connect to last body byte.
    pub timeout: Duration,
    /// Number of tries per request; values below 1 count as 1.
    pub tries: u32,
    /// Wait between two tries.
    pub delay: Duration,
}

impl HttpSenderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            user_agent: format!("monibot/{}", crate::VERSION),
            timeout: Duration::from_secs(10),
            tries: 1,
            delay: Duration::from_secs(5),
        }
    }
}

/// A `Sender` performing blocking HTTP requests.
#[derive(Clone)]
pub struct HttpSender {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
    user_agent: String,
    tries: u32,
    delay: Duration,
}

impl HttpSender {
    pub fn new(config: HttpSenderConfig) -> Self {
        // Status codes are classified here, not by ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {}", config.api_key),
            user_agent: config.user_agent,
            tries: config.tries.max(1),
            delay: config.delay,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        let url = self.url(&request.path);
        let auth = self.authorization.as_str();
        let agent_header = self.user_agent.as_str();
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => self
                .agent
                .get(&url)
                .header("Authorization", auth)
                .header("User-Agent", agent_header)
                .call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&url)
                .header("Authorization", auth)
                .header("User-Agent", agent_header)
                .content_type(FORM_CONTENT_TYPE)
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self
                .agent
                .post(&url)
                .header("Authorization", auth)
                .header("User-Agent", agent_header)
                .send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        classify(status, body)
    }
}

impl Sender for HttpSender {
    fn send(&self, ctx: &CancellationToken, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        let mut attempt = 1;
        loop {
            if ctx.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            let result = self.execute(request);
            if ctx.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            match result {
                Ok(data) => {
                    debug!(path = %request.path, bytes = data.len(), attempt, "monibot response");
                    return Ok(data);
                }
                Err(err) if attempt < self.tries && is_retryable(&err) => {
                    warn!(
                        path = %request.path,
                        attempt,
                        tries = self.tries,
                        error = %err,
                        "monibot request failed, retrying"
                    );
                    attempt += 1;
                    wait(ctx, self.delay)?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Map an HTTP status and body to the sender's result.
fn classify(status: u16, body: Vec<u8>) -> Result<Vec<u8>, ApiError> {
    match status {
        200..=299 => Ok(body),
        404 => Err(ApiError::NotFound),
        _ => Err(ApiError::HttpError {
            status,
            body: String::from_utf8_lossy(&body).trim().to_string(),
        }),
    }
}

fn is_retryable(err: &ApiError) -> bool {
    match err {
        ApiError::Transport(_) => true,
        ApiError::HttpError { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Sleep for `delay`, returning early with `Cancelled` if `ctx` fires.
fn wait(ctx: &CancellationToken, delay: Duration) -> Result<(), ApiError> {
    let deadline = Instant::now() + delay;
    loop {
        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        thread::sleep((deadline - now).min(CANCEL_POLL));
    }
}
