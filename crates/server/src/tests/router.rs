use crate::app::{build_app, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use khub_core::AppResult;
use khub_knowledge::retrieval::{GenerativeBackend, GenerativeQuery, GraphQlResponse};
use khub_knowledge::{
    AnswerRetriever, Catalog, Concept, ConceptExtractor, ExtractionError, MemoryStore,
    ReadinessGate, Resource, ResourceStatus, SearchService,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticExtractor;

    #[async_trait::async_trait]
    impl ConceptExtractor for StaticExtractor {
        async fn extract(&self, _question: &str) -> Result<Vec<Concept>, ExtractionError> {
            Ok(vec![Concept::from("section 54")])
        }
    }

    struct StaticBackend {
        data: Value,
    }

    #[async_trait::async_trait]
    impl GenerativeBackend for StaticBackend {
        async fn execute(&self, _query: &GenerativeQuery) -> AppResult<GraphQlResponse> {
            Ok(GraphQlResponse::with_data(self.data.clone()))
        }
    }

    fn tax_agent_data() -> Value {
        json!({ "Get": { "Tax_Agent": [{
            "source": "doc-17",
            "_additional": {
                "generate": { "groupedResult": "Section 54 exempts capital gains..." }
            }
        }] } })
    }

    async fn app_with(data: Value, shutdown: CancellationToken) -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let search = SearchService::new(
            ReadinessGate::new(store.clone()),
            Arc::new(StaticExtractor),
            AnswerRetriever::new(Arc::new(StaticBackend { data })),
        );
        let state = AppState {
            search: Arc::new(search),
            catalog: Arc::new(Catalog::new(store.clone(), store.clone())),
            db_pool: None,
            shutdown,
        };
        (build_app(state), store)
    }

    async fn app() -> (Router, Arc<MemoryStore>) {
        app_with(tax_agent_data(), CancellationToken::new()).await
    }

    async fn seed_ingested(store: &MemoryStore) {
        store
            .insert_resource(Resource {
                id: 1,
                domain_id: "Tax_Agent".to_string(),
                name: "Section 54".to_string(),
                description: String::new(),
                status: ResourceStatus::Ingested,
                url: "https://example.com/54".to_string(),
                created_at: Utc::now(),
                updated_at: None,
                ingestion_started_at: None,
                ingestion_completed_at: None,
            })
            .await;
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_raw(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_answer() {
        let (app, store) = app().await;
        seed_ingested(&store).await;

        let (status, body) = send(
            app,
            get("/search?domainId=Tax_Agent&question=What%20is%20section%2054%3F"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Section 54 exempts capital gains...");
        assert_eq!(body["sources"], json!(["doc-17"]));
        assert_eq!(body["query"]["domainId"], "Tax_Agent");
        assert_eq!(body["query"]["question"], "What is section 54?");
        assert_eq!(body["query"]["concepts"], json!(["section 54"]));
    }

    #[tokio::test]
    async fn test_search_on_empty_domain_is_bad_request() {
        let (app, _store) = app().await;

        let (status, body) = send(app, get("/search?domainId=Empty_Domain&question=hi")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert!(body["error"].as_str().unwrap().contains("Empty_Domain"));
    }

    #[tokio::test]
    async fn test_search_requires_parameters() {
        let (app, _store) = app().await;

        let (status, body) = send(app, get("/search?domainId=Tax_Agent")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "domainId and question are required");
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_opaque() {
        let (app, store) = app_with(
            json!({ "Get": { "Tax_Agent": [] } }),
            CancellationToken::new(),
        )
        .await;
        seed_ingested(&store).await;

        let (status, body) = send(app, get("/search?domainId=Tax_Agent&question=hi")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "code": 500, "error": "Internal Server Error" })
        );
    }

    #[tokio::test]
    async fn test_search_during_shutdown_is_unavailable() {
        let shutdown = CancellationToken::new();
        let (app, store) = app_with(tax_agent_data(), shutdown.clone()).await;
        seed_ingested(&store).await;
        shutdown.cancel();

        let (status, body) = send(app, get("/search?domainId=Tax_Agent&question=hi")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], 503);
    }

    #[tokio::test]
    async fn test_domain_lifecycle() {
        let (app, _store) = app().await;

        let (status, created) = send(
            app.clone(),
            post_json(
                "/domains",
                json!({ "id": "Tax_Agent", "name": "Tax agent", "description": "Income tax" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], "Tax_Agent");
        assert!(created["createdAt"].is_string());

        let (status, listed) = send(app.clone(), get("/domains")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = send(app.clone(), delete("/domains/Tax_Agent")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(app, delete("/domains/Tax_Agent")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_invalid_domain_is_bad_request() {
        let (app, _store) = app().await;

        let (status, body) = send(
            app,
            post_json("/domains", json!({ "id": "tax", "name": "Tax agent" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("id"));
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_body() {
        let (app, _store) = app().await;

        let (status, body) = send(app.clone(), post_raw("/domains", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["error"], "invalid message body. please check documentation.");

        // Well-formed JSON missing a required field.
        let (status, body) = send(
            app,
            post_json("/domains/Tax_Agent/resources", json!({ "name": "Section 54" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_non_numeric_resource_id_is_bad_request() {
        let (app, _store) = app().await;

        let (status, body) = send(app, delete("/domains/Tax_Agent/resources/abc")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["error"], "invalid path parameters");
    }

    #[tokio::test]
    async fn test_resource_lifecycle() {
        let (app, _store) = app().await;
        send(
            app.clone(),
            post_json("/domains", json!({ "id": "Tax_Agent", "name": "Tax agent" })),
        )
        .await;

        let (status, created) = send(
            app.clone(),
            post_json(
                "/domains/Tax_Agent/resources",
                json!({ "name": "Section 54", "url": "https://example.com/54" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "NEW");
        assert_eq!(created["domainId"], "Tax_Agent");

        let (status, listed) = send(app.clone(), get("/domains/Tax_Agent/resources")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let id = created["id"].as_i64().unwrap();
        let (status, _) = send(
            app.clone(),
            delete(&format!("/domains/Tax_Agent/resources/{}", id)),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(app, delete(&format!("/domains/Tax_Agent/resources/{}", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resource_for_unknown_domain() {
        let (app, _store) = app().await;

        let (status, body) = send(
            app,
            post_json(
                "/domains/Unknown/resources",
                json!({ "name": "Section 54", "url": "https://example.com/54" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid domain id");
    }

    #[tokio::test]
    async fn test_health_in_memory() {
        let (app, _store) = app().await;

        let (status, body) = send(app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"]["status"], "memory");
    }
}
