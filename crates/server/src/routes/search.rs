use crate::app::AppState;
use crate::error::ApiError;
use crate::extract::QueryParams;
use axum::extract::State;
use axum::Json;
use khub_knowledge::{Answer, Query};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub question: String,
}

/// Answer a question against a domain.
pub async fn search_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Answer>, ApiError> {
    if params.domain_id.trim().is_empty() || params.question.trim().is_empty() {
        return Err(ApiError::bad_request("domainId and question are required"));
    }

    let cancel = state.shutdown.child_token();
    let answer = state
        .search
        .search(Query::new(params.domain_id, params.question), &cancel)
        .await?;

    Ok(Json(answer))
}
