use crate::app::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParams};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use khub_knowledge::{NewResource, Resource};

pub async fn list_resources(
    State(state): State<AppState>,
    PathParams(domain_id): PathParams<String>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    Ok(Json(state.catalog.list_resources(&domain_id).await?))
}

pub async fn add_resource(
    State(state): State<AppState>,
    PathParams(domain_id): PathParams<String>,
    JsonBody(resource): JsonBody<NewResource>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    let created = state.catalog.add_resource(&domain_id, resource).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    PathParams((domain_id, resource_id)): PathParams<(String, i64)>,
) -> Result<StatusCode, ApiError> {
    if state.catalog.delete_resource(&domain_id, resource_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "resource {} not found in domain {}",
            resource_id, domain_id
        )))
    }
}
