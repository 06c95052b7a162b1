//! Request builders, one per Monibot endpoint.
//!
//! # Design
//! Each builder produces an `HttpRequest` and nothing else. Paths are
//! relative to the API root and ids are substituted verbatim. The caller
//! (normally `Api`) passes the request to a `Sender`.

use crate::encoding;
use crate::http::HttpRequest;
use crate::types::MachineSample;

pub fn ping() -> HttpRequest {
    HttpRequest::get("ping")
}

pub fn list_watchdogs() -> HttpRequest {
    HttpRequest::get("watchdogs")
}

pub fn get_watchdog(id: &str) -> HttpRequest {
    HttpRequest::get(format!("watchdog/{id}"))
}

pub fn watchdog_heartbeat(id: &str) -> HttpRequest {
    HttpRequest::post(format!("watchdog/{id}/heartbeat"), None)
}

pub fn list_machines() -> HttpRequest {
    HttpRequest::get("machines")
}

pub fn get_machine(id: &str) -> HttpRequest {
    HttpRequest::get(format!("machine/{id}"))
}

pub fn machine_sample(id: &str, sample: &MachineSample) -> HttpRequest {
    HttpRequest::post(format!("machine/{id}/sample"), Some(encoding::encode_sample(sample)))
}

pub fn machine_text(id: &str, text: &str) -> HttpRequest {
    HttpRequest::post(format!("machine/{id}/text"), Some(encoding::encode_text(text)))
}

pub fn list_metrics() -> HttpRequest {
    HttpRequest::get("metrics")
}

pub fn get_metric(id: &str) -> HttpRequest {
    HttpRequest::get(format!("metric/{id}"))
}

pub fn metric_inc(id: &str, value: i64) -> HttpRequest {
    HttpRequest::post(format!("metric/{id}/inc"), Some(encoding::encode_value(value)))
}

pub fn metric_set(id: &str, value: i64) -> HttpRequest {
    HttpRequest::post(format!("metric/{id}/set"), Some(encoding::encode_value(value)))
}

pub fn metric_values(id: &str, values: &[i64]) -> HttpRequest {
    HttpRequest::post(format!("metric/{id}/values"), Some(encoding::encode_values(values)))
}
