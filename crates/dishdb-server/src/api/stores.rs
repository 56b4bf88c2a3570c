//! Catalog browsing and maintenance. Store names in paths match
//! case-insensitively.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use dishdb_core::{Category, Store};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{run_blocking, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StoreList {
    total_stores: usize,
    stores: Vec<Store>,
}

#[derive(Debug, Serialize)]
pub(super) struct StoreCategories {
    #[serde(rename = "nameStore")]
    store_name: String,
    total_categories: usize,
    total_dishes: usize,
    categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedStore {
    deleted: String,
    total_stores: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearedCatalog {
    cleared: bool,
}

fn store_not_found(req_id: String, name: &str) -> ApiError {
    ApiError::new(req_id, "not_found", format!("store '{name}' not found"))
}

async fn find_store(state: &AppState, req_id: &str, name: String) -> Result<Store, ApiError> {
    let catalog = Arc::clone(&state.catalog);
    let lookup = name.clone();
    run_blocking(req_id, move || catalog.find(&lookup))
        .await?
        .ok_or_else(|| store_not_found(req_id.to_string(), &name))
}

pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StoreList>>, ApiError> {
    let catalog = Arc::clone(&state.catalog);
    let stores = run_blocking(&req_id.0, move || catalog.load()).await?;

    Ok(Json(ApiResponse {
        data: StoreList {
            total_stores: stores.len(),
            stores,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Store>>, ApiError> {
    let store = find_store(&state, &req_id.0, name).await?;
    Ok(Json(ApiResponse {
        data: store,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_store_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<StoreCategories>>, ApiError> {
    let store = find_store(&state, &req_id.0, name).await?;
    let total_dishes = store.dish_count();

    Ok(Json(ApiResponse {
        data: StoreCategories {
            store_name: store.name,
            total_categories: store.categories.len(),
            total_dishes,
            categories: store.categories,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<DeletedStore>>, ApiError> {
    let _guard = state.write_lock.lock().await;
    let catalog = Arc::clone(&state.catalog);
    let target = name.clone();
    let remaining = run_blocking(&req_id.0, move || {
        if catalog.remove(&target)? {
            catalog.load().map(|stores| Some(stores.len()))
        } else {
            Ok(None)
        }
    })
    .await?;

    let Some(total_stores) = remaining else {
        return Err(store_not_found(req_id.0, &name));
    };
    tracing::info!(store = %name, total_stores, "store deleted");

    Ok(Json(ApiResponse {
        data: DeletedStore {
            deleted: name,
            total_stores,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn clear_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ClearedCatalog>>, ApiError> {
    let _guard = state.write_lock.lock().await;
    let catalog = Arc::clone(&state.catalog);
    run_blocking(&req_id.0, move || catalog.clear()).await?;
    tracing::info!("catalog cleared");

    Ok(Json(ApiResponse {
        data: ClearedCatalog { cleared: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
