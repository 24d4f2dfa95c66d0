use crate::app::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParams};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use khub_knowledge::{Domain, NewDomain};

pub async fn list_domains(State(state): State<AppState>) -> Result<Json<Vec<Domain>>, ApiError> {
    Ok(Json(state.catalog.list_domains().await?))
}

pub async fn add_domain(
    State(state): State<AppState>,
    JsonBody(domain): JsonBody<NewDomain>,
) -> Result<(StatusCode, Json<Domain>), ApiError> {
    let created = state.catalog.add_domain(domain).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a domain together with its resources.
pub async fn delete_domain(
    State(state): State<AppState>,
    PathParams(domain_id): PathParams<String>,
) -> Result<StatusCode, ApiError> {
    if state.catalog.delete_domain(&domain_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("domain {} not found", domain_id)))
    }
}
