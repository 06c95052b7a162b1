//! Wire encoding of request bodies.
//!
//! # Design
//! Every function here is pure and deterministic. Bodies are
//! `application/x-www-form-urlencoded` strings produced by
//! `form_urlencoded::Serializer`, so field order is exactly the order of the
//! `append_pair` calls. Floats always carry three fractional digits and use
//! `.` as separator, which Rust's formatting guarantees independent of locale.

use chrono::{DateTime, Utc};

use crate::types::MachineSample;

/// Render a float with exactly three fractional digits: `1.01` -> `"1.010"`.
pub fn format_float(value: f64) -> String {
    format!("{value:.3}")
}

/// Render a UTC instant as decimal epoch milliseconds.
pub fn format_timestamp(tstamp: DateTime<Utc>) -> String {
    tstamp.timestamp_millis().to_string()
}

/// Encode free text as the single form field `text`. Line breaks become
/// `%0A` so a multi-line text survives as one value.
pub fn encode_text(text: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("text", text)
        .finish()
}

/// Encode a single integer as the form field `value`.
pub fn encode_value(value: i64) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("value", &value.to_string())
        .finish()
}

/// Encode a machine sample. Field names and order are part of the wire
/// contract.
pub fn encode_sample(sample: &MachineSample) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("tstamp", &sample.tstamp.to_string())
        .append_pair("load1", &format_float(sample.load1))
        .append_pair("load5", &format_float(sample.load5))
        .append_pair("load15", &format_float(sample.load15))
        .append_pair("cpu", &sample.cpu_percent.to_string())
        .append_pair("mem", &sample.mem_percent.to_string())
        .append_pair("disk", &sample.disk_percent.to_string())
        .append_pair("diskRead", &sample.disk_read.to_string())
        .append_pair("diskWrite", &sample.disk_write.to_string())
        .append_pair("netRecv", &sample.net_recv.to_string())
        .append_pair("netSend", &sample.net_send.to_string())
        .finish()
}

/// Encode a batch of values as the form field `values`, holding the
/// compact form produced by [`compact_values`].
pub fn encode_values(values: &[i64]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("values", &compact_values(values))
        .finish()
}

/// Compact a batch of values into the service's histogram notation.
///
/// Values are sorted ascending and equal values are grouped. A group is
/// written as `v` when `v` occurs once and `v:n` when it occurs `n` times;
/// groups are joined with `,`. `[3,5,2,5,0,3,4,3,1]` becomes
/// `0,1,2,3:3,4,5:2`.
///
/// The result is never longer than the plain comma-joined listing: a group
/// of `n >= 2` copies of `v` costs `len(v) + 1 + len(n)` instead of
/// `n * len(v) + (n - 1)`.
pub fn compact_values(values: &[i64]) -> String {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mut out = String::new();
    for group in sorted.chunk_by(|a, b| a == b) {
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(&group[0].to_string());
        if group.len() > 1 {
            out.push(':');
            out.push_str(&group.len().to_string());
        }
    }
    out
}
