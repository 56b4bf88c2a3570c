use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dishdb_core::CatalogError;
use dishdb_recommend::{
    price_stats, recommend, validate_request, PriceReport, PriceStats, RecommendationRequest,
    RecommendationResult, Strategy,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_catalog_error, run_blocking, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

/// JSON body for `POST /api/v1/recommendations`.
///
/// `budget` accepts either text (`"300 MAD"`) or a bare number. The numeric
/// fields accept JSON numbers or numeric strings (`"2"`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecommendationBody {
    pub budget: Option<Value>,
    pub num_plates: Option<Value>,
    pub algorithm: Option<String>,
    pub max_results: Option<Value>,
    pub seed: Option<Value>,
}

/// Query string for `GET /api/v1/recommendations`. Numbers are parsed by
/// hand so malformed values produce a `validation_error` envelope.
#[derive(Debug, Deserialize)]
pub(super) struct RecommendationQuery {
    pub budget: Option<String>,
    pub plates: Option<String>,
    pub algorithm: Option<String>,
    pub max: Option<String>,
    pub seed: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum PriceStatsData {
    NoData { message: &'static str },
    Report(PriceReport),
}

// ---------------------------------------------------------------------------
// Input normalization
// ---------------------------------------------------------------------------

fn budget_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn positive_count(req_id: &str, field: &str, value: i64) -> Result<usize, ApiError> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| {
            ApiError::new(
                req_id,
                "validation_error",
                format!("{field} must be at least 1, got {value}"),
            )
        })
}

fn parse_number<T: std::str::FromStr>(req_id: &str, field: &str, raw: &str) -> Result<T, ApiError> {
    raw.trim().parse().map_err(|_| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("{field} must be a number, got '{raw}'"),
        )
    })
}

fn number_field<T: std::str::FromStr>(
    req_id: &str,
    field: &str,
    value: Option<Value>,
) -> Result<Option<T>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => parse_number(req_id, field, &n.to_string()).map(Some),
        Some(Value::String(s)) => parse_number(req_id, field, &s).map(Some),
        Some(other) => Err(ApiError::new(
            req_id,
            "validation_error",
            format!("{field} must be a number, got {other}"),
        )),
    }
}

fn build_request(
    state: &AppState,
    req_id: &str,
    budget: Option<String>,
    num_plates: Option<i64>,
    algorithm: Option<&str>,
    max_results: Option<i64>,
    seed: Option<u64>,
) -> Result<RecommendationRequest, ApiError> {
    let (Some(budget), Some(num_plates)) = (budget, num_plates) else {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "budget and number of plates are required",
        ));
    };
    let num_plates = positive_count(req_id, "numPlates", num_plates)?;
    let max_results = match max_results {
        Some(value) => positive_count(req_id, "maxResults", value)?,
        None => state.config.default_max_results,
    };
    let strategy = algorithm.map_or_else(Strategy::default, Strategy::parse_or_default);

    let request = RecommendationRequest::new(budget, num_plates)
        .with_strategy(strategy)
        .with_max_results(max_results)
        .with_seed(seed);
    validate_request(&request)
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))?;
    Ok(request)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn recommend_body(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RecommendationBody>,
) -> Result<Json<ApiResponse<RecommendationResult>>, ApiError> {
    let num_plates = number_field::<i64>(&req_id.0, "numPlates", body.num_plates)?;
    let max_results = number_field::<i64>(&req_id.0, "maxResults", body.max_results)?;
    let seed = number_field::<u64>(&req_id.0, "seed", body.seed)?;

    let request = build_request(
        &state,
        &req_id.0,
        budget_text(body.budget),
        num_plates,
        body.algorithm.as_deref(),
        max_results,
        seed,
    )?;
    run_recommendation(&state, req_id, request).await
}

pub(super) async fn recommend_query(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<ApiResponse<RecommendationResult>>, ApiError> {
    let num_plates = query
        .plates
        .as_deref()
        .map(|raw| parse_number::<i64>(&req_id.0, "plates", raw))
        .transpose()?;
    let max_results = query
        .max
        .as_deref()
        .map(|raw| parse_number::<i64>(&req_id.0, "max", raw))
        .transpose()?;
    let seed = query
        .seed
        .as_deref()
        .map(|raw| parse_number::<u64>(&req_id.0, "seed", raw))
        .transpose()?;

    let request = build_request(
        &state,
        &req_id.0,
        query.budget,
        num_plates,
        query.algorithm.as_deref(),
        max_results,
        seed,
    )?;
    run_recommendation(&state, req_id, request).await
}

/// Loads a catalog snapshot and searches it on the blocking pool, bounded by
/// the configured timeout. A timed-out search keeps running to completion in
/// the background; only the response is abandoned.
async fn run_recommendation(
    state: &AppState,
    req_id: RequestId,
    request: RecommendationRequest,
) -> Result<Json<ApiResponse<RecommendationResult>>, ApiError> {
    let catalog = Arc::clone(&state.catalog);
    let limit = Duration::from_secs(state.config.search_timeout_secs);
    let strategy = request.strategy;

    let task = tokio::task::spawn_blocking(move || -> Result<_, CatalogError> {
        let stores = catalog.load()?;
        if stores.is_empty() {
            return Ok(None);
        }
        Ok(Some(recommend(&stores, &request)))
    });

    match tokio::time::timeout(limit, task).await {
        Err(_) => {
            tracing::warn!(
                strategy = %strategy,
                timeout_secs = limit.as_secs(),
                "recommendation search timed out"
            );
            Err(ApiError::new(
                req_id.0,
                "timeout",
                format!("search did not finish within {}s", limit.as_secs()),
            ))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "recommendation task failed");
            Err(ApiError::new(
                req_id.0,
                "internal_error",
                "recommendation task failed",
            ))
        }
        Ok(Ok(Err(e))) => Err(map_catalog_error(req_id.0, &e)),
        Ok(Ok(Ok(None))) => Err(ApiError::new(
            req_id.0,
            "not_found",
            "no stores data found; import or scrape stores first",
        )),
        Ok(Ok(Ok(Some(result)))) => Ok(Json(ApiResponse {
            data: result,
            meta: ResponseMeta::new(req_id.0),
        })),
    }
}

pub(super) async fn price_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<PriceStatsData>>, ApiError> {
    let catalog = Arc::clone(&state.catalog);
    let stats = run_blocking(&req_id.0, move || {
        catalog.load().map(|stores| price_stats(&stores))
    })
    .await?;

    let data = match stats {
        PriceStats::NoData => PriceStatsData::NoData {
            message: "No price data available",
        },
        PriceStats::Report(report) => PriceStatsData::Report(report),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
