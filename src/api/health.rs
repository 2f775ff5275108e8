//! Liveness and readiness probes

use std::future::Future;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::DomainError;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of probing one store
#[derive(Serialize, Debug)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl HealthCheck {
    /// Time `check` and record whether it succeeded
    async fn probe<T>(
        name: &'static str,
        check: impl Future<Output = Result<T, DomainError>>,
    ) -> Self {
        let start = Instant::now();
        let result = check.await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
        };

        Self {
            name,
            status,
            message,
            latency_ms,
        }
    }
}

/// GET /health: the process is up
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION"),
        checks: Vec::new(),
        latency_ms: None,
    })
}

/// GET /live: bare liveness probe
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /ready: the account and catalog stores answer queries
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let checks = vec![
        HealthCheck::probe("user_store", state.user_service.count()).await,
        HealthCheck::probe("catalog_store", state.catalog_service.list_courses()).await,
    ];
    let status = overall(&checks);

    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }),
    )
}

fn overall(checks: &[HealthCheck]) -> HealthStatus {
    if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_records_failure_message() {
        let check =
            HealthCheck::probe("store", async { Err::<(), _>(DomainError::storage("down")) }).await;

        assert_eq!(check.name, "store");
        assert_eq!(check.status, HealthStatus::Unhealthy);
        assert!(check.message.unwrap().contains("down"));
    }

    #[tokio::test]
    async fn test_one_failed_probe_fails_readiness() {
        let checks = vec![
            HealthCheck::probe("a", async { Ok::<_, DomainError>(1) }).await,
            HealthCheck::probe("b", async { Err::<(), _>(DomainError::internal("x")) }).await,
        ];

        assert_eq!(overall(&checks[..1]), HealthStatus::Healthy);
        assert_eq!(overall(&checks), HealthStatus::Unhealthy);
    }

    #[test]
    fn test_liveness_body_omits_checks() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "1.0.0",
            checks: Vec::new(),
            latency_ms: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"status": "healthy", "version": "1.0.0"}));
    }
}
