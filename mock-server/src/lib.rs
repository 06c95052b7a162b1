use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// API key accepted by `app()`.
pub const API_KEY: &str = "test-api-key";

pub const COUNTER: i32 = 0;
pub const GAUGE: i32 = 1;
pub const HISTOGRAM: i32 = 2;

/// Upper bound for one expanded `values` batch.
const MAX_BATCH: usize = 100_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchdog {
    pub id: String,
    pub name: String,
    pub interval_millis: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub tstamp: i64,
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub cpu: i32,
    pub mem: i32,
    pub disk: i32,
    pub disk_read: i64,
    pub disk_write: i64,
    pub net_recv: i64,
    pub net_send: i64,
}

#[derive(Deserialize)]
pub struct TextForm {
    pub text: String,
}

#[derive(Deserialize)]
pub struct ValueForm {
    pub value: i64,
}

#[derive(Deserialize)]
pub struct ValuesForm {
    pub values: String,
}

/// Everything the mock service knows and has received.
#[derive(Debug, Default)]
pub struct Db {
    pub watchdogs: Vec<Watchdog>,
    pub machines: Vec<Machine>,
    pub metrics: Vec<Metric>,
    pub heartbeats: HashMap<String, u32>,
    pub samples: HashMap<String, Vec<Sample>>,
    pub texts: HashMap<String, Vec<String>>,
    pub metric_values: HashMap<String, i64>,
    pub histograms: HashMap<String, Vec<i64>>,
}

impl Db {
    /// Two watchdogs, two machines and one metric of each kind.
    pub fn seeded() -> Self {
        Self {
            watchdogs: vec![
                watchdog("0001", "Cronjob 1", 72_000_000),
                watchdog("0002", "Cronjob 2", 36_000_000),
            ],
            machines: vec![machine("01", "Server 1"), machine("02", "Server 2")],
            metrics: vec![
                metric("01", "Requests", COUNTER),
                metric("02", "Queue size", GAUGE),
                metric("03", "Response time", HISTOGRAM),
            ],
            ..Self::default()
        }
    }
}

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

pub struct Service {
    pub api_key: String,
    pub db: RwLock<Db>,
}

impl Service {
    pub fn new(api_key: &str, db: Db) -> Arc<Self> {
        Arc::new(Self {
            api_key: api_key.to_string(),
            db: RwLock::new(db),
        })
    }
}

pub type SharedService = Arc<Service>;

/// The mock service with seeded data, accepting `API_KEY`.
pub fn app() -> Router {
    router(Service::new(API_KEY, Db::seeded()))
}

pub fn router(service: SharedService) -> Router {
    let api = Router::new()
        .route("/ping", get(ping))
        .route("/watchdogs", get(list_watchdogs))
        .route("/watchdog/{id}", get(get_watchdog))
        .route("/watchdog/{id}/heartbeat", post(watchdog_heartbeat))
        .route("/machines", get(list_machines))
        .route("/machine/{id}", get(get_machine))
        .route("/machine/{id}/sample", post(machine_sample))
        .route("/machine/{id}/text", post(machine_text))
        .route("/metrics", get(list_metrics))
        .route("/metric/{id}", get(get_metric))
        .route("/metric/{id}/inc", post(metric_inc))
        .route("/metric/{id}/set", post(metric_set))
        .route("/metric/{id}/values", post(metric_values))
        .route_layer(middleware::from_fn_with_state(service.clone(), require_api_key))
        .with_state(service);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, service: SharedService) -> Result<(), std::io::Error> {
    axum::serve(listener, router(service)).await
}

/// Expand the compact histogram notation (`0,1,3:3`) into its values.
pub fn expand_values(compact: &str) -> Result<Vec<i64>, String> {
    let mut values = Vec::new();
    if compact.is_empty() {
        return Ok(values);
    }
    for group in compact.split(',') {
        let (value, count) = match group.split_once(':') {
            Some((value, count)) => {
                let count: usize =
                    count.parse().map_err(|_| format!("invalid count in {group:?}"))?;
                (value, count)
            }
            None => (group, 1),
        };
        let value: i64 = value.parse().map_err(|_| format!("invalid value in {group:?}"))?;
        let too_many = values.len().checked_add(count).map_or(true, |n| n > MAX_BATCH);
        if count == 0 || too_many {
            return Err(format!("invalid count in {group:?}"));
        }
        values.extend(std::iter::repeat(value).take(count));
    }
    Ok(values)
}

async fn require_api_key(
    State(service): State<SharedService>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = format!("Bearer {}", service.api_key);
    let given = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if given != Some(expected.as_str()) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

async fn ping() -> StatusCode {
    StatusCode::OK
}

async fn list_watchdogs(State(service): State<SharedService>) -> Json<Vec<Watchdog>> {
    Json(service.db.read().await.watchdogs.clone())
}

async fn get_watchdog(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<Watchdog>, StatusCode> {
    let db = service.db.read().await;
    db.watchdogs.iter().find(|w| w.id == id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn watchdog_heartbeat(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut db = service.db.write().await;
    if !db.watchdogs.iter().any(|w| w.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    debug!(%id, "heartbeat");
    *db.heartbeats.entry(id).or_default() += 1;
    Ok(StatusCode::OK)
}

async fn list_machines(State(service): State<SharedService>) -> Json<Vec<Machine>> {
    Json(service.db.read().await.machines.clone())
}

async fn get_machine(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<Machine>, StatusCode> {
    let db = service.db.read().await;
    db.machines.iter().find(|m| m.id == id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn machine_sample(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    Form(sample): Form<Sample>,
) -> Result<StatusCode, StatusCode> {
    let mut db = service.db.write().await;
    if !db.machines.iter().any(|m| m.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    debug!(%id, tstamp = sample.tstamp, "sample");
    db.samples.entry(id).or_default().push(sample);
    Ok(StatusCode::OK)
}

async fn machine_text(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    Form(input): Form<TextForm>,
) -> Result<StatusCode, StatusCode> {
    let mut db = service.db.write().await;
    if !db.machines.iter().any(|m| m.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    debug!(%id, len = input.text.len(), "text");
    db.texts.entry(id).or_default().push(input.text);
    Ok(StatusCode::OK)
}

async fn list_metrics(State(service): State<SharedService>) -> Json<Vec<Metric>> {
    Json(service.db.read().await.metrics.clone())
}

async fn get_metric(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<Metric>, StatusCode> {
    let db = service.db.read().await;
    db.metrics.iter().find(|m| m.id == id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Look up the kind of metric `id`, failing unless it is `expected`.
fn check_kind(db: &Db, id: &str, expected: i32) -> Result<(), StatusCode> {
    let metric = db.metrics.iter().find(|m| m.id == id).ok_or(StatusCode::NOT_FOUND)?;
    if metric.kind != expected {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

async fn metric_inc(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    Form(input): Form<ValueForm>,
) -> Result<StatusCode, StatusCode> {
    let mut db = service.db.write().await;
    check_kind(&db, &id, COUNTER)?;
    *db.metric_values.entry(id).or_default() += input.value;
    Ok(StatusCode::OK)
}

async fn metric_set(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    Form(input): Form<ValueForm>,
) -> Result<StatusCode, StatusCode> {
    let mut db = service.db.write().await;
    check_kind(&db, &id, GAUGE)?;
    db.metric_values.insert(id, input.value);
    Ok(StatusCode::OK)
}

async fn metric_values(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    Form(input): Form<ValuesForm>,
) -> Result<StatusCode, StatusCode> {
    let values = expand_values(&input.values).map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut db = service.db.write().await;
    check_kind(&db, &id, HISTOGRAM)?;
    db.histograms.entry(id).or_default().extend(values);
    Ok(StatusCode::OK)
}
