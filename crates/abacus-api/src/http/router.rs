//! Axum router configuration with middleware.
//!
//! All engine routes are under `/api/v1/`; `/health` sits at the root.
//! Middleware: CORS and request tracing.

use axum::Router;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Skills
        .route("/skills", get(handlers::skill::list_skills))
        .route("/skills/chain", post(handlers::chain::execute_chain))
        .route(
            "/skills/{id}",
            get(handlers::skill::get_skill).post(handlers::skill::execute_skill),
        )
        .route("/skills/{id}/adapt", post(handlers::skill::adapt_skill))
        // Public allow-listed execution
        .route(
            "/public/execute",
            get(handlers::public::list_public).post(handlers::public::public_execute),
        )
        // Execution log
        .route("/logs", get(handlers::stats::get_logs))
        .route("/stats", get(handlers::stats::get_stats));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> axum::Json<Value> {
    axum::Json(json!({ "success": true, "data": { "status": "ok" } }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use abacus_types::config::AbacusConfig;
    use abacus_types::log::ExecutionSource;

    fn app() -> (Router, AppState) {
        let state = AppState::init(AbacusConfig::default()).unwrap();
        (build_router(state.clone()), state)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app();
        let (status, body) = send(router, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_and_search_skills() {
        let (router, _) = app();
        let (status, body) = send(router.clone(), get_req("/api/v1/skills")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["count"], 13);

        let (_, body) = send(router.clone(), get_req("/api/v1/skills?q=mortgage")).await;
        assert_eq!(body["data"]["count"], 3);
        assert_eq!(body["data"]["skills"][0]["id"], "mortgage.calculate");

        let (_, body) = send(router, get_req("/api/v1/skills?q=refinance")).await;
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["skills"][0]["id"], "mortgage.refinance");
    }

    #[tokio::test]
    async fn test_describe_skill() {
        let (router, _) = app();
        let (status, body) = send(router, get_req("/api/v1/skills/capital.growth")).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["id"], "capital.growth");
        assert_eq!(data["defaultValues"]["annualReturnRate"], 7);
        assert_eq!(data["defaultValues"]["initialCapital"], 0);
        let fields = data["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[2]["step"], 0.1);
    }

    #[tokio::test]
    async fn test_describe_unknown_lists_known_ids() {
        let (router, _) = app();
        let (status, body) = send(router, get_req("/api/v1/skills/nope.missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["kind"], "not_found");
        let known = body["error"]["details"]["availableSkills"].as_array().unwrap();
        assert!(known.iter().any(|id| id == "tax.calculate"));
    }

    #[tokio::test]
    async fn test_execute_records_log() {
        let (router, state) = app();
        let (status, body) = send(
            router,
            post_json(
                "/api/v1/skills/tax.calculate",
                json!({"input": {"annualIncome": 1_000_000}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["taxAmount"], 27_700.0);

        let logs = state.logger.recent(1);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].skill_id, "tax.calculate");
        assert!(logs[0].success);
    }

    #[tokio::test]
    async fn test_execute_validation_error() {
        let (router, state) = app();
        let (status, body) = send(
            router,
            post_json("/api/v1/skills/tax.calculate", json!({"input": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "validation");
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("annualIncome")
        );
        assert_eq!(state.logger.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_execution_error_is_unprocessable() {
        let (router, _) = app();
        let (status, body) = send(
            router,
            post_json(
                "/api/v1/skills/mortgage.calculate",
                json!({"input": {"loanAmount": 1_000_000, "annualRate": 2, "years": 5, "gracePeriod": 5}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["kind"], "execution");
        assert!(body["error"]["message"].as_str().unwrap().contains("grace period"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (router, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/skills/tax.calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_adapt_adds_chart_data() {
        let (router, _) = app();
        let (status, body) = send(
            router,
            post_json(
                "/api/v1/skills/mortgage.calculate/adapt",
                json!({"input": {"loanAmount": 1_000_000, "annualRate": 2, "years": 20}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let chart = body["data"]["chartData"].as_array().unwrap();
        assert_eq!(chart.len(), 21);
        assert_eq!(chart[0]["value"], 1_000_000.0);
        assert!(body["data"]["monthlyPayment"].is_number());
    }

    #[tokio::test]
    async fn test_chain_passes_previous_output() {
        let (router, state) = app();
        let (status, body) = send(
            router,
            post_json(
                "/api/v1/skills/chain",
                json!({"skills": [
                    {"skillId": "salary.analyze", "input": {"monthlySalary": 50_000}},
                    {"skillId": "tax.calculate", "input": {"annualIncome": "$previous.annual.gross"}},
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["finalOutput"]["annualIncome"], 600_000.0);

        let logs = state.logger.recent(2);
        assert!(logs.iter().all(|e| e.source == Some(ExecutionSource::Chain)));
    }

    #[tokio::test]
    async fn test_chain_abort_and_empty_chain() {
        let (router, _) = app();
        let (status, body) = send(
            router.clone(),
            post_json(
                "/api/v1/skills/chain",
                json!({"skills": [
                    {"skillId": "salary.analyze", "input": {}},
                    {"skillId": "tax.calculate", "input": {"annualIncome": "$previous.annual.gross"}},
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 1);
        assert_eq!(body["error"]["kind"], "validation");

        let (status, body) =
            send(router, post_json("/api/v1/skills/chain", json!({"skills": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_public_execute_gate() {
        let (router, _) = app();

        let (status, body) = send(
            router.clone(),
            post_json(
                "/api/v1/public/execute",
                json!({"skillId": "capital.growth", "input": {"initialCapital": 1000, "monthlyContribution": 100}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["summary"]["totalAssets"].is_number());

        let (status, body) = send(
            router.clone(),
            post_json("/api/v1/public/execute", json!({"skillId": "tax.optimize", "input": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["kind"], "forbidden");

        let (status, _) = send(
            router.clone(),
            post_json("/api/v1/public/execute", json!({"skillId": "salary.reverse", "input": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(router, get_req("/api/v1/public/execute")).await;
        assert_eq!(body["data"]["allowed"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_public_execution_error_is_redacted() {
        let (router, _) = app();
        let (status, body) = send(
            router,
            post_json(
                "/api/v1/public/execute",
                json!({"skillId": "mortgage.calculate", "input": {"loanAmount": 1000, "annualRate": 2, "years": 3, "gracePeriod": 3}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(!message.contains("grace period"));
        assert!(message.contains("internal error"));
    }

    #[tokio::test]
    async fn test_logs_and_stats() {
        let (router, _) = app();
        for income in [500_000, 800_000] {
            send(
                router.clone(),
                post_json(
                    "/api/v1/skills/tax.calculate",
                    json!({"input": {"annualIncome": income}}),
                ),
            )
            .await;
        }
        send(
            router.clone(),
            post_json("/api/v1/skills/tax.calculate", json!({"input": {"annualIncome": -1}})),
        )
        .await;

        let (_, body) = send(router.clone(), get_req("/api/v1/logs?limit=2")).await;
        assert_eq!(body["data"]["count"], 2);
        assert_eq!(body["data"]["logs"][0]["success"], false);

        let (_, body) = send(router, get_req("/api/v1/stats")).await;
        assert_eq!(body["data"]["total"], 3);
        assert_eq!(body["data"]["success"], 2);
        assert_eq!(body["data"]["failed"], 1);
        assert_eq!(body["data"]["bySkill"]["tax.calculate"]["count"], 3);
    }
}
