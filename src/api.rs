//! HTTP API for the ShiftPulse engine.
//!
//! This module exposes the engine over a minimal REST API built on
//! [`axum`](https://crates.io/crates/axum).  Clients post the records
//! they already hold and receive plain JSON back; the server stores
//! nothing except the active engine configuration, which can be read
//! and replaced at runtime.

use crate::attendance::{mark_attendance, summarize_attendance};
use crate::config::EngineConfig;
use crate::detector::detect_alerts;
use crate::engine::run_dashboard;
use crate::error::EngineError;
use crate::models::{
    AttendanceMark, AttendanceRecord, DashboardInput, DateRange, Employee, MarkOutcome,
    ShiftRecord,
};
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Application state shared across requests.
pub struct AppState {
    pub config: RwLock<EngineConfig>,
}

#[derive(Debug, Deserialize)]
pub struct AlertsRequest {
    #[serde(default)]
    pub employees: Vec<Employee>,
    pub shifts: Vec<ShiftRecord>,
    pub as_of: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceSummaryRequest {
    pub records: Vec<AttendanceRecord>,
    pub range: DateRange,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    #[serde(default)]
    pub existing: Vec<AttendanceRecord>,
    pub business_date: NaiveDate,
    pub marks: Vec<AttendanceMark>,
}

#[derive(Debug, Serialize)]
pub struct MarkAttendanceResponse {
    pub records: Vec<AttendanceRecord>,
    pub stats: MarkOutcome,
}

/// Build the API router around `config`.  Returns the router and a
/// handle to its state.
pub fn router(config: EngineConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: RwLock::new(config),
    });
    let router = Router::new()
        .route("/api/dashboard", post(dashboard_handler))
        .route("/api/alerts", post(alerts_handler))
        .route("/api/attendance/summary", post(attendance_summary_handler))
        .route("/api/attendance/mark", post(mark_attendance_handler))
        .route("/api/config", get(get_config_handler).put(put_config_handler))
        .with_state(state.clone());
    (router, state)
}

/// Load the configuration (defaults when no path is given) and build the
/// router.
pub fn build_router(config_path: Option<&Path>) -> Result<(Router, Arc<AppState>)> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => {
            info!("no configuration file given, using defaults");
            EngineConfig::default()
        }
    };
    Ok(router(config))
}

fn error_response(err: EngineError) -> Response {
    let status = match err {
        EngineError::InvalidRecord { .. } | EngineError::InvalidConfig { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::ConfigIo(_) | EngineError::ConfigParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(error = %err, status = status.as_u16(), "request rejected");
    let body = Json(serde_json::json!({"error": err.to_string()}));
    (status, body).into_response()
}

/// Extractor failures (malformed JSON, missing fields, a config that
/// fails validation) get the same `{"error": ...}` body as engine errors.
fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let message = rejection.body_text();
    warn!(error = %message, status = status.as_u16(), "request body rejected");
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

/// Handler for POST /api/dashboard
async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    payload: std::result::Result<Json<DashboardInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let config = app_state.config.read().await;
    match run_dashboard(&input, &config) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for POST /api/alerts
async fn alerts_handler(
    State(app_state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AlertsRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let config = app_state.config.read().await;
    match detect_alerts(&request.shifts, &request.employees, &config, request.as_of) {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for POST /api/attendance/summary
async fn attendance_summary_handler(
    payload: std::result::Result<Json<AttendanceSummaryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let summary = summarize_attendance(&request.records, request.range);
    (StatusCode::OK, Json(summary)).into_response()
}

/// Handler for POST /api/attendance/mark
async fn mark_attendance_handler(
    payload: std::result::Result<Json<MarkAttendanceRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    match mark_attendance(&request.existing, request.business_date, &request.marks) {
        Ok((records, stats)) => {
            (StatusCode::OK, Json(MarkAttendanceResponse { records, stats })).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Handler for GET /api/config
async fn get_config_handler(State(app_state): State<Arc<AppState>>) -> Response {
    let config = app_state.config.read().await;
    (StatusCode::OK, Json(config.clone())).into_response()
}

/// Handler for PUT /api/config.  The body is validated while it is
/// deserialised, so an invalid configuration never replaces the active
/// one.
async fn put_config_handler(
    State(app_state): State<Arc<AppState>>,
    payload: std::result::Result<Json<EngineConfig>, JsonRejection>,
) -> Response {
    let Json(config) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let mut active = app_state.config.write().await;
    *active = config;
    info!("engine configuration replaced");
    (StatusCode::OK, Json(active.clone())).into_response()
}

/// Launch the API server.  Loads the configuration, binds to `addr` and
/// runs until the server terminates.
pub async fn serve(addr: &str, config_path: Option<&Path>) -> Result<()> {
    let (router, _state) = build_router(config_path)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(router: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn missed_shift(hours: f64) -> Value {
        json!({
            "id": "s1",
            "employee_id": "e1",
            "business_date": "2026-02-10",
            "scheduled_start": "2026-02-10T06:00:00",
            "scheduled_end": "2026-02-10T14:00:00",
            "scheduled_hours": hours
        })
    }

    #[tokio::test]
    async fn test_dashboard_endpoint() {
        logging::init_test();
        let (router, _) = router(EngineConfig::default());
        let body = json!({
            "employees": [{"id": "e1", "first_name": "Liam", "last_name": "Novak"}],
            "shifts": [missed_shift(8.0)],
            "range": {"start": "2026-02-09", "end": "2026-02-11"},
            "as_of": "2026-02-12"
        });
        let (status, value) = send(router, "POST", "/api/dashboard", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["summary"]["missed_count"], 1);
        assert_eq!(value["daily_trend"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["alerts"][0]["type"], "Missed Shift");
        assert_eq!(value["employee_stats"][0]["display_name"], "Liam Novak");
        assert_eq!(value["employee_stats"][0]["avg_compliance"], 0);
        assert_eq!(value["employee_stats"][0]["avg_break"], Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_record_is_unprocessable() {
        let (router, _) = router(EngineConfig::default());
        let body = json!({
            "shifts": [missed_shift(-8.0)],
            "as_of": "2026-02-12"
        });
        let (status, value) = send(router, "POST", "/api/alerts", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].as_str().unwrap_or_default().contains("scheduled_hours"));
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_error() {
        let (router, _) = router(EngineConfig::default());
        let (status, value) = send(router.clone(), "POST", "/api/dashboard", json!({"shifts": []})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].as_str().unwrap_or_default().contains("range"));

        let request = Request::builder()
            .method("POST")
            .uri("/api/alerts")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn test_config_roundtrip_rejects_invalid() {
        let (router, state) = router(EngineConfig::default());

        let (status, value) = send(router.clone(), "PUT", "/api/config", json!({"alert_cap": 0})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].as_str().unwrap_or_default().contains("alert_cap"));
        assert_eq!(state.config.read().await.alert_cap(), 50);

        let (status, value) = send(router.clone(), "PUT", "/api/config", json!({"alert_cap": "x"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].is_string());
        assert_eq!(state.config.read().await.alert_cap(), 50);

        let (status, value) = send(router.clone(), "PUT", "/api/config", json!({"alert_cap": 5})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["alert_cap"], 5);
        assert_eq!(state.config.read().await.alert_cap(), 5);

        let request = Request::builder().uri("/api/config").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_attendance_endpoints() {
        let (router, _) = router(EngineConfig::default());
        let body = json!({
            "business_date": "2026-02-10",
            "marks": [
                {"employee_id": "e1", "status": "Present"},
                {"employee_id": "e2", "status": "Late", "notes": "called ahead"}
            ]
        });
        let (status, value) = send(router.clone(), "POST", "/api/attendance/mark", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["stats"]["created"], 2);

        let body = json!({
            "records": value["records"],
            "range": {"start": "2026-02-01", "end": "2026-02-28"}
        });
        let (status, value) = send(router, "POST", "/api/attendance/summary", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({"total": 2, "present": 1, "absent": 0, "late": 1}));
    }
}
