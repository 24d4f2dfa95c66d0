use crate::app::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 OK when the store is reachable, 503 Service Unavailable
/// otherwise. The in-memory store is always reachable.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.db_pool {
        None => DatabaseHealth {
            status: "memory".to_string(),
            error: None,
        },
        Some(pool) => match tokio::time::timeout(
            Duration::from_secs(5),
            sqlx::query("SELECT 1").execute(pool),
        )
        .await
        {
            Ok(Ok(_)) => DatabaseHealth {
                status: "ok".to_string(),
                error: None,
            },
            Ok(Err(e)) => DatabaseHealth {
                status: "error".to_string(),
                error: Some(format!("Query failed: {}", e)),
            },
            Err(_) => DatabaseHealth {
                status: "error".to_string(),
                error: Some("Query timeout (>5s)".to_string()),
            },
        },
    };

    let healthy = database.status != "error";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
        }),
    )
}
