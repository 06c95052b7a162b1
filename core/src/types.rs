//! Domain DTOs for the Monibot API.
//!
//! # Design
//! Resource types mirror the service's JSON but are defined independently of
//! the mock-server crate; integration tests catch schema drift. Decoding is
//! lenient: `#[serde(default)]` leaves a missing field at its zero value, a
//! `null` field decodes to its zero value too, and unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A scheduled heartbeat check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Watchdog {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub interval_millis: i64,
}

/// A monitored host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Machine {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// A named counter, gauge or histogram tracked by the service.
///
/// `kind` is carried as opaque data; the client never switches on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metric {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: i32,
}

/// One telemetry snapshot for a machine, built by the caller per submission.
///
/// Field order here matches the wire order of the encoded sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MachineSample {
    /// Epoch milliseconds, UTC.
    pub tstamp: i64,
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub cpu_percent: i32,
    pub mem_percent: i32,
    pub disk_percent: i32,
    pub disk_read: i64,
    pub disk_write: i64,
    pub net_recv: i64,
    pub net_send: i64,
}
