use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::ask;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/ask", post(ask::ask))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer())
}

/// Application router plus the Prometheus scrape endpoint when metrics are enabled
pub fn create_router_with_metrics(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router(state);

    match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics, metrics_path)),
        None => router,
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{
        DomainError, EchoGenerator, MockRetriever, MockVectorIndex, Retrieval, RetrievedPassage,
    };
    use crate::infrastructure::pipeline::RagPipeline;

    fn state_with(retriever: MockRetriever, index: MockVectorIndex) -> AppState {
        let pipeline = RagPipeline::new(Arc::new(retriever), Arc::new(EchoGenerator::new()));
        AppState::new(Arc::new(pipeline), Arc::new(index))
    }

    fn passages() -> Retrieval {
        Retrieval::from_passages(
            vec![
                RetrievedPassage::new("agents_chunk_0", "Agents perceive.", 0.91),
                RetrievedPassage::new("agents_chunk_1", "Agents act.", 0.74),
            ],
            3,
            "\n\n",
        )
    }

    fn ask_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_active() {
        let app = create_router(state_with(
            MockRetriever::returning(Retrieval::empty()),
            MockVectorIndex::new(),
        ));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "active", "info": "Agentic AI RAG System"})
        );
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_similarity() {
        let app = create_router(state_with(
            MockRetriever::returning(passages()),
            MockVectorIndex::new(),
        ));

        let response = app
            .oneshot(ask_request(json!({"question": "What do agents do?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = json_body(response).await;
        assert_eq!(body["context"], "Agents perceive.\n\nAgents act.");
        assert_eq!(body["similarity"], body["confidence"]);
        assert_eq!(body["passages_used"], 2);
        assert_eq!(body["relevant"], true);
        assert_eq!(
            body["answer"],
            "What do agents do? => Agents perceive.\n\nAgents act."
        );
    }

    #[tokio::test]
    async fn test_ask_with_empty_index_still_answers() {
        let app = create_router(state_with(
            MockRetriever::returning(Retrieval::empty()),
            MockVectorIndex::new(),
        ));

        let response = app
            .oneshot(ask_request(json!({"question": "Anything?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["context"], "");
        assert_eq!(body["similarity"], 0.0);
        assert_eq!(body["relevant"], false);
    }

    #[tokio::test]
    async fn test_blank_question_is_bad_request() {
        let app = create_router(state_with(
            MockRetriever::returning(passages()),
            MockVectorIndex::new(),
        ));

        let response = app
            .oneshot(ask_request(json!({"question": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_bad_gateway() {
        let app = create_router(state_with(
            MockRetriever::failing(DomainError::vector_index("connection refused")),
            MockVectorIndex::new(),
        ));

        let response = app
            .oneshot(ask_request(json!({"question": "What is RAG?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["stage"], "retrieval");
        assert!(body.get("answer").is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = create_router(state_with(
            MockRetriever::returning(passages()),
            MockVectorIndex::new(),
        ));

        let response = app
            .oneshot(ask_request(json!({"query": "wrong field"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "invalid_json");
    }

    #[tokio::test]
    async fn test_ready_reflects_index_health() {
        let healthy = create_router(state_with(
            MockRetriever::returning(Retrieval::empty()),
            MockVectorIndex::new(),
        ));
        let failing = create_router(state_with(
            MockRetriever::returning(Retrieval::empty()),
            MockVectorIndex::new().failing(),
        ));

        let ready = || Request::builder().uri("/ready").body(Body::empty()).unwrap();

        assert_eq!(healthy.oneshot(ready()).await.unwrap().status(), StatusCode::OK);

        let response = failing.oneshot(ready()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["checks"][0]["name"], "vector_index:mock-index");
    }

    #[tokio::test]
    async fn test_health_and_live() {
        let app = create_router(state_with(
            MockRetriever::returning(Retrieval::empty()),
            MockVectorIndex::new(),
        ));

        let health = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let live = app
            .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(live.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_absent_when_disabled() {
        let app = create_router_with_metrics(
            state_with(
                MockRetriever::returning(Retrieval::empty()),
                MockVectorIndex::new(),
            ),
            None,
            "/metrics",
        );

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
