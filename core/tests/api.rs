//! Facade behaviour against the scripted `FakeSender`.
//!
//! Each step queues exactly one response, calls one operation, and checks
//! the recorded call string and the decoded result.

use std::thread;

use chrono::{TimeZone, Utc};
use monibot_core::{
    Api, ApiError, CancellationToken, FakeSender, HttpMethod, HttpRequest, Machine, MachineSample,
    Metric, Sender, Watchdog,
};

fn watchdog(id: &str, name: &str, interval_millis: i64) -> Watchdog {
    Watchdog {
        id: id.to_string(),
        name: name.to_string(),
        interval_millis,
    }
}

fn machine(id: &str, name: &str) -> Machine {
    Machine {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn metric(id: &str, name: &str, kind: i32) -> Metric {
    Metric {
        id: id.to_string(),
        name: name.to_string(),
        kind,
    }
}

/// Assert the fake saw exactly `expected` and consumed every queued response.
fn assert_single_call(fake: &FakeSender, expected: &str) {
    assert_eq!(fake.take_calls(), vec![expected.to_string()]);
    assert_eq!(fake.pending_responses(), 0);
}

#[test]
fn every_operation_maps_to_one_call() {
    let fake = FakeSender::new();
    let api = Api::new(&fake);
    let ctx = CancellationToken::new();

    // GET ping
    fake.push_data("");
    api.get_ping(&ctx).unwrap();
    assert_single_call(&fake, "GET ping");

    // GET watchdogs
    fake.push_data(
        r#"[
            {"id":"0001", "name":"Cronjob 1", "intervalMillis": 72000000},
            {"id":"0002", "name":"Cronjob 2", "intervalMillis": 36000000}
        ]"#,
    );
    let watchdogs = api.get_watchdogs(&ctx).unwrap();
    assert_eq!(
        watchdogs,
        vec![watchdog("0001", "Cronjob 1", 72_000_000), watchdog("0002", "Cronjob 2", 36_000_000)]
    );
    assert_single_call(&fake, "GET watchdogs");

    // GET watchdog/00000001
    fake.push_data(r#"{"id":"0001", "name":"Cronjob 1", "intervalMillis": 72000000}"#);
    let found = api.get_watchdog(&ctx, "00000001").unwrap();
    assert_eq!(found, watchdog("0001", "Cronjob 1", 72_000_000));
    assert_single_call(&fake, "GET watchdog/00000001");

    // POST watchdog/00000001/heartbeat
    fake.push_data("");
    api.post_watchdog_heartbeat(&ctx, "00000001").unwrap();
    assert_single_call(&fake, "POST watchdog/00000001/heartbeat");

    // GET machines
    fake.push_data(r#"[{"id":"01", "name":"Server 1"}, {"id":"02", "name":"Server 2"}]"#);
    let machines = api.get_machines(&ctx).unwrap();
    assert_eq!(machines, vec![machine("01", "Server 1"), machine("02", "Server 2")]);
    assert_single_call(&fake, "GET machines");

    // GET machine/01
    fake.push_data(r#"{"id":"01", "name":"Server 1"}"#);
    assert_eq!(api.get_machine(&ctx, "01").unwrap(), machine("01", "Server 1"));
    assert_single_call(&fake, "GET machine/01");

    // POST machine/00000001/sample
    fake.push_data("");
    let tstamp = Utc.with_ymd_and_hms(2023, 10, 27, 10, 0, 0).unwrap();
    let sample = MachineSample {
        tstamp: tstamp.timestamp_millis(),
        load1: 1.01,
        load5: 0.78,
        load15: 0.12,
        cpu_percent: 12,
        mem_percent: 34,
        disk_percent: 12,
        disk_read: 678,
        disk_write: 567,
        net_recv: 13,
        net_send: 14,
    };
    api.post_machine_sample(&ctx, "00000001", &sample).unwrap();
    assert_single_call(
        &fake,
        "POST machine/00000001/sample tstamp=1698400800000&load1=1.010&load5=0.780&load15=0.120\
         &cpu=12&mem=34&disk=12&diskRead=678&diskWrite=567&netRecv=13&netSend=14",
    );

    // POST machine/00000001/text
    fake.push_data("");
    api.post_machine_text(&ctx, "00000001", "line1\nline2\n\n").unwrap();
    assert_single_call(&fake, "POST machine/00000001/text text=line1%0Aline2%0A%0A");

    // GET metrics
    fake.push_data(
        r#"[{"id":"01", "name":"Metric 1", "type": 0}, {"id":"02", "name":"Metric 2", "type": 1}]"#,
    );
    let metrics = api.get_metrics(&ctx).unwrap();
    assert_eq!(metrics, vec![metric("01", "Metric 1", 0), metric("02", "Metric 2", 1)]);
    assert_single_call(&fake, "GET metrics");

    // GET metric/01
    fake.push_data(r#"{"id":"01", "name":"Metric 1", "type": 0}"#);
    assert_eq!(api.get_metric(&ctx, "01").unwrap(), metric("01", "Metric 1", 0));
    assert_single_call(&fake, "GET metric/01");
}

#[test]
fn metric_writes_surface_transport_errors() {
    let fake = FakeSender::new();
    let api = Api::new(&fake);
    let ctx = CancellationToken::new();

    fake.push_error(ApiError::Transport("connect timeout".to_string()));
    let err = api.post_metric_inc(&ctx, "00000001", 42).unwrap_err();
    assert_eq!(err.to_string(), "connect timeout");
    assert_single_call(&fake, "POST metric/00000001/inc value=42");

    fake.push_error(ApiError::Transport("connect timeout".to_string()));
    let err = api.post_metric_set(&ctx, "00000001", 113).unwrap_err();
    assert_eq!(err.to_string(), "connect timeout");
    assert_single_call(&fake, "POST metric/00000001/set value=113");

    fake.push_error(ApiError::Transport("connect timeout".to_string()));
    let err = api
        .post_metric_values(&ctx, "010101", &[3, 5, 2, 5, 0, 3, 4, 3, 1])
        .unwrap_err();
    assert_eq!(err.to_string(), "connect timeout");
    // "0%2C1%2C2%2C3%3A3%2C4%2C5%3A2" is the form encoding of "0,1,2,3:3,4,5:2"
    assert_single_call(&fake, "POST metric/010101/values values=0%2C1%2C2%2C3%3A3%2C4%2C5%3A2");
}

#[test]
fn every_operation_returns_the_sender_error() {
    let fake = FakeSender::new();
    let api = Api::new(&fake);
    let ctx = CancellationToken::new();
    let sample = MachineSample::default();
    let failure = ApiError::HttpError {
        status: 502,
        body: "bad gateway".to_string(),
    };

    let results: Vec<Result<(), ApiError>> = vec![
        {
            fake.push_error(failure.clone());
            api.get_ping(&ctx)
        },
        {
            fake.push_error(failure.clone());
            api.get_watchdogs(&ctx).map(drop)
        },
        {
            fake.push_error(failure.clone());
            api.get_watchdog(&ctx, "1").map(drop)
        },
        {
            fake.push_error(failure.clone());
            api.post_watchdog_heartbeat(&ctx, "1")
        },
        {
            fake.push_error(failure.clone());
            api.get_machines(&ctx).map(drop)
        },
        {
            fake.push_error(failure.clone());
            api.get_machine(&ctx, "1").map(drop)
        },
        {
            fake.push_error(failure.clone());
            api.post_machine_sample(&ctx, "1", &sample)
        },
        {
            fake.push_error(failure.clone());
            api.post_machine_text(&ctx, "1", "x")
        },
        {
            fake.push_error(failure.clone());
            api.get_metrics(&ctx).map(drop)
        },
        {
            fake.push_error(failure.clone());
            api.get_metric(&ctx, "1").map(drop)
        },
        {
            fake.push_error(failure.clone());
            api.post_metric_inc(&ctx, "1", 1)
        },
        {
            fake.push_error(failure.clone());
            api.post_metric_set(&ctx, "1", 1)
        },
        {
            fake.push_error(failure.clone());
            api.post_metric_values(&ctx, "1", &[1])
        },
    ];

    assert_eq!(results.len(), 13);
    for result in results {
        assert_eq!(result, Err(failure.clone()));
    }
    assert_eq!(fake.take_calls().len(), 13);
    assert_eq!(fake.pending_responses(), 0);
}

#[test]
fn unscripted_call_fails_with_no_response() {
    let fake = FakeSender::new();
    let api = Api::new(&fake);

    let err = api.get_machines(&CancellationToken::new()).unwrap_err();
    assert_eq!(
        err,
        ApiError::NoResponse {
            method: HttpMethod::Get,
            path: "machines".to_string()
        }
    );
}

#[test]
fn cancellation_token_is_forwarded() {
    let fake = FakeSender::new();
    fake.push_data("");
    let api = Api::new(&fake);
    let ctx = CancellationToken::new();
    ctx.cancel();

    assert_eq!(api.get_ping(&ctx).unwrap_err(), ApiError::Cancelled);
}

#[test]
fn malformed_response_is_a_decode_error() {
    let fake = FakeSender::new();
    let api = Api::new(&fake);
    let ctx = CancellationToken::new();

    fake.push_data("<html>oops</html>");
    assert!(matches!(api.get_watchdogs(&ctx), Err(ApiError::DeserializationError(_))));

    fake.push_data("");
    assert!(matches!(api.get_metric(&ctx, "1"), Err(ApiError::DeserializationError(_))));
}

/// Answers by path, so concurrent callers don't depend on call order.
struct RoutingSender;

impl Sender for RoutingSender {
    fn send(&self, _ctx: &CancellationToken, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        match (request.method, request.path.as_str()) {
            (HttpMethod::Get, path) if path.starts_with("watchdog/") => {
                let id = &path["watchdog/".len()..];
                let body = format!(
                    r#"{{"id":"{id}","name":"Watchdog {id}","intervalMillis":60000}}"#
                );
                Ok(body.into_bytes())
            }
            (HttpMethod::Post, path) if path.ends_with("/inc") => {
                if request.body.as_deref() == Some("value=1") {
                    Ok(Vec::new())
                } else {
                    Err(ApiError::HttpError {
                        status: 400,
                        body: "unexpected body".to_string(),
                    })
                }
            }
            _ => Err(ApiError::NotFound),
        }
    }
}

#[test]
fn concurrent_reads_and_writes_do_not_interfere() {
    let api = Api::new(RoutingSender);
    let ctx = CancellationToken::new();

    thread::scope(|scope| {
        for worker in 0..8 {
            let api = &api;
            let ctx = &ctx;
            scope.spawn(move || {
                for round in 0..50 {
                    let id = format!("{worker}-{round}");
                    let found = api.get_watchdog(ctx, &id).unwrap();
                    assert_eq!(found.id, id);
                    assert_eq!(found.name, format!("Watchdog {id}"));
                    api.post_metric_inc(ctx, &id, 1).unwrap();
                }
            });
        }
    });
}
