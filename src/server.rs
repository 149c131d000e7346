// HTTP transport for the named operations
//
// POST /api/tools/:name runs one operation with the JSON body as arguments.
// Ledger work is blocking SQLite I/O, so it runs on the blocking pool.

use crate::ledger::Ledger;
use crate::resources::{self, ResourceError, RESOURCES};
use crate::tools::{self, ToolFault};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

pub fn create_router(ledger: Arc<Ledger>) -> Router {
    let state = AppState { ledger };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(call_tool))
        .route("/resources", get(list_resources))
        .route("/resources/:name", get(read_resource))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /api/tools
async fn list_tools() -> impl IntoResponse {
    Json(tools::catalog())
}

/// POST /api/tools/:name - empty body means no arguments
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    info!("POST /api/tools/{}", name);

    let args: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(args) => args,
            Err(e) => {
                return fault_response(ToolFault::InvalidArguments(e.to_string()));
            }
        }
    };

    let ledger = Arc::clone(&state.ledger);
    let outcome =
        tokio::task::spawn_blocking(move || tools::call_tool(&ledger, &name, args)).await;

    match outcome {
        Ok(Ok(result)) => (StatusCode::OK, Json(result)).into_response(),
        Ok(Err(fault)) => fault_response(fault),
        Err(join_err) => {
            error!("tool task aborted: {}", join_err);
            internal_error()
        }
    }
}

/// GET /api/resources
async fn list_resources() -> impl IntoResponse {
    Json(&RESOURCES[..])
}

/// GET /api/resources/:name - raw bytes, declared content type
async fn read_resource(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    info!("GET /api/resources/{}", name);

    let ledger = Arc::clone(&state.ledger);
    let outcome =
        tokio::task::spawn_blocking(move || resources::read_resource(&ledger, &name)).await;

    match outcome {
        Ok(Ok(content)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content.mime_type)],
            content.bytes,
        )
            .into_response(),
        Ok(Err(err @ ResourceError::Unknown(_))) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "message": err.to_string() })),
        )
            .into_response(),
        Ok(Err(err)) => {
            error!("Error reading resource: {}", err);
            internal_error()
        }
        Err(join_err) => {
            error!("resource task aborted: {}", join_err);
            internal_error()
        }
    }
}

fn fault_response(fault: ToolFault) -> Response {
    let status = match &fault {
        ToolFault::UnknownTool(_) => StatusCode::NOT_FOUND,
        ToolFault::InvalidArguments(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ToolFault::Internal(_) | ToolFault::Encode(_) => {
            error!("Error running tool: {}", fault);
            return internal_error();
        }
    };

    (
        status,
        Json(json!({ "status": "error", "message": fault.to_string() })),
    )
        .into_response()
}

/// Storage details stay in the log
fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": "Internal error" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let categories = dir.path().join("categories.json");
        std::fs::write(&categories, "{\"food\": []}").unwrap();

        let ledger = Ledger::new(dir.path().join("expenses.db"), categories);
        (dir, create_router(Arc::new(ledger)))
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .method(Method::POST)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_request(app: Router, uri: &str) -> Response {
        app.oneshot(
            Request::builder()
                .uri(uri)
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = test_app();
        let response = get_request(app, "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_add_then_list_over_http() {
        let (_dir, app) = test_app();

        let (status, body) = post_json(
            app.clone(),
            "/api/tools/add_expense",
            json!({"amount": 10, "category": "food", "subcategory": "", "note": "lunch", "date": "2024-01-01"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let (status, body) = post_json(
            app,
            "/api/tools/list_expenses",
            json!({"start_date": "2024-01-01", "end_date": "2024-01-01"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["type"], "expense");
    }

    #[tokio::test]
    async fn test_validation_errors_are_ok_responses() {
        let (_dir, app) = test_app();

        let (status, body) = post_json(
            app,
            "/api/tools/add_expense",
            json!({"amount": -4, "category": "food", "subcategory": "", "note": "", "date": "2024-01-01"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "error", "message": "Invalid amount"}));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_404() {
        let (_dir, app) = test_app();
        let (status, body) = post_json(app, "/api/tools/launch", json!({})).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Unknown tool: launch");
    }

    #[tokio::test]
    async fn test_missing_argument_is_422() {
        let (_dir, app) = test_app();
        let (status, body) = post_json(app, "/api/tools/delete_expense", json!({})).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_malformed_body_is_422() {
        let (_dir, app) = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tools/list_expenses")
                    .method(Method::POST)
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_tool_catalog() {
        let (_dir, app) = test_app();
        let response = get_request(app, "/api/tools").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 7);
        assert_eq!(body[0]["name"], "add_expense");
    }

    #[tokio::test]
    async fn test_categories_resource_bytes() {
        let (_dir, app) = test_app();
        let response = get_request(app, "/api/resources/categories").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"{\"food\": []}");
    }

    #[tokio::test]
    async fn test_unknown_resource_is_404() {
        let (_dir, app) = test_app();
        let response = get_request(app, "/api/resources/budgets").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storage_fault_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(
            dir.path().join("missing").join("expenses.db"),
            dir.path().join("categories.json"),
        );
        let app = create_router(Arc::new(ledger));

        let (status, body) = post_json(
            app,
            "/api/tools/list_expenses",
            json!({"start_date": "2024-01-01", "end_date": "2024-01-31"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal error");
    }
}
