//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (test mode and preview)
/// - REST-ish API under `/api/v1/...` (authoring, grading, previews, tests)
/// - Static dashboard from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)),
        )
        .fallback_service(static_service)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(http::http_health))
        // Buildings
        .route("/buildings", get(http::list_buildings).post(http::create_building))
        .route(
            "/buildings/:id",
            get(http::get_building).patch(http::update_building).delete(http::delete_building),
        )
        .route("/buildings/:id/passages", get(http::list_passages).post(http::create_passage))
        // Passages
        .route("/passages/:id", patch(http::update_passage).delete(http::delete_passage))
        .route("/passages/:id/position", put(http::reorder_passage))
        .route("/passages/:id/nodes", get(http::list_nodes).post(http::create_node))
        .route(
            "/passages/:id/boss",
            get(http::get_boss).put(http::set_boss).post(http::create_boss).delete(http::clear_boss),
        )
        // Nodes
        .route("/nodes/:id", get(http::get_node).patch(http::update_node).delete(http::delete_node))
        .route("/nodes/:id/position", put(http::reorder_node))
        .route("/nodes/:id/questions", get(http::list_questions).post(http::create_question))
        // Questions
        .route(
            "/questions/:id",
            get(http::get_question).put(http::update_question).delete(http::delete_question),
        )
        .route("/questions/:id/position", put(http::reorder_question))
        .route("/questions/:id/type", put(http::set_question_type))
        .route("/questions/:id/edit", post(http::edit_question))
        // Registry + grading
        .route("/question-types", get(http::list_blanks))
        .route("/question-types/:tag", get(http::get_blank))
        .route("/grade", post(http::grade))
        // Preview sessions
        .route("/previews", post(http::preview_start))
        .route("/previews/:id", get(http::preview_view).delete(http::preview_discard))
        .route("/previews/:id/act", post(http::preview_act))
        .route("/previews/:id/check", post(http::preview_check))
        .route("/previews/:id/restart", post(http::preview_restart))
        .route("/previews/:id/sync", post(http::preview_sync))
        // Test runs
        .route("/tests", post(http::test_start))
        .route("/tests/:id", get(http::test_view).delete(http::test_discard))
        .route("/tests/:id/select", post(http::test_select))
        .route("/tests/:id/submit", post(http::test_submit))
        .route("/tests/:id/answer", post(http::test_answer))
        .route("/tests/:id/advance", post(http::test_advance))
        .route("/tests/:id/restart", post(http::test_restart))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::notify::TracingSink;

    fn app() -> Router {
        build_router(Arc::new(AppState::with(AppConfig::default(), Arc::new(TracingSink))))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => req.header("content-type", "application/json").body(Body::from(v.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, v)
    }

    async fn first_id(app: &Router, uri: &str) -> u64 {
        let (status, v) = call(app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        v[0]["id"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn health_answers() {
        let (status, v) = call(&app(), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn missing_question_is_a_json_404() {
        let (status, v) = call(&app(), "GET", "/api/v1/questions/999999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(v["error"], "not_found");
        assert!(v["message"].is_string());
    }

    #[tokio::test]
    async fn preview_sync_with_an_empty_body_rereads_the_question() {
        let app = app();
        let building = first_id(&app, "/api/v1/buildings").await;
        let passage = first_id(&app, &format!("/api/v1/buildings/{building}/passages")).await;
        let node = first_id(&app, &format!("/api/v1/passages/{passage}/nodes")).await;
        let question = first_id(&app, &format!("/api/v1/nodes/{node}/questions")).await;

        let (status, p) = call(&app, "POST", "/api/v1/previews", Some(json!({ "questionId": question }))).await;
        assert_eq!(status, StatusCode::OK);
        let sync = format!("/api/v1/previews/{}/sync", p["id"].as_str().unwrap());

        let (status, v) = call(&app, "POST", &sync, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["reset"], false);

        let replaced = json!({ "type": "fill_gap", "content": { "question": "I ___ home.", "correct_answer": "went" } });
        let (status, _) = call(&app, "PUT", &format!("/api/v1/questions/{question}"), Some(replaced)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, v) = call(&app, "POST", &sync, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["reset"], true);
        assert_eq!(v["preview"]["type"], "fill_gap");
    }
}
