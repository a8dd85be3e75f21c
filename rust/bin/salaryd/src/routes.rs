//! Route registration: collects module routes + system endpoints.

use std::sync::Arc;

use axum::middleware;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use crate::middleware::{cors_middleware, log_middleware, CorsState};

/// Build the complete router with all routes.
///
/// Module routers carry absolute paths and are merged at the root.
pub fn build_router(cors: Arc<CorsState>, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/", get(index_page))
        .route("/api", get(api_info))
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        tracing::debug!("mounting module {}", name);
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(cors, cors_middleware))
        .layer(middleware::from_fn(log_middleware))
}

async fn index_page() -> impl IntoResponse {
    Html(include_str!("web/index.html"))
}

async fn api_info() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "title": "SALARY PREDICTION API V1.0",
        "message": "Welcome to the Data Science Salary Prediction API",
        "endpoints": {
            "POST /salary": "Create a new salary prediction",
            "GET /salary": "List all predictions",
            "GET /salary/<id>": "Get a prediction by id",
            "PUT /salary/<id>": "Update a prediction",
            "DELETE /salary/<id>": "Delete a prediction",
            "POST /predict": "Predict a salary without storing it",
        },
    }))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "salaryd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
