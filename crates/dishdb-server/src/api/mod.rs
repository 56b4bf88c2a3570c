mod recommendations;
mod stores;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use dishdb_core::{AppConfig, CatalogError, CatalogStore};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub config: Arc<AppConfig>,
    /// Held across load-modify-save sequences on the catalog file.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            catalog: Arc::new(CatalogStore::new(config.data_dir.clone())),
            config,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    catalog: &'static str,
    stores: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_catalog_error(request_id: String, error: &CatalogError) -> ApiError {
    tracing::error!(error = %error, "catalog access failed");
    ApiError::new(request_id, "internal_error", "catalog access failed")
}

/// Runs blocking catalog I/O off the async executor.
pub(super) async fn run_blocking<T, F>(request_id: &str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CatalogError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(map_catalog_error(request_id.to_string(), &e)),
        Err(e) => {
            tracing::error!(error = %e, "blocking catalog task failed");
            Err(ApiError::new(
                request_id,
                "internal_error",
                "catalog task failed",
            ))
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/recommendations",
            get(recommendations::recommend_query).post(recommendations::recommend_body),
        )
        .route(
            "/api/v1/recommendations/stats",
            get(recommendations::price_statistics),
        )
        .route(
            "/api/v1/stores",
            get(stores::list_stores).delete(stores::clear_stores),
        )
        .route(
            "/api/v1/stores/{name}",
            get(stores::get_store).delete(stores::delete_store),
        )
        .route(
            "/api/v1/stores/{name}/categories",
            get(stores::list_store_categories),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let catalog = Arc::clone(&state.catalog);

    match tokio::task::spawn_blocking(move || catalog.load()).await {
        Ok(Ok(stores)) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    catalog: "ok",
                    stores: stores.len(),
                },
                meta,
            }),
        ),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "health check: catalog unreadable");
            degraded(meta)
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check: catalog task failed");
            degraded(meta)
        }
    }
}

fn degraded(meta: ResponseMeta) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse {
            data: HealthData {
                status: "degraded",
                catalog: "unavailable",
                stores: 0,
            },
            meta,
        }),
    )
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
