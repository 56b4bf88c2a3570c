use axum::body::{to_bytes, Body};
use axum::http::Request;
use dishdb_core::Environment;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

use super::*;

fn test_state(dir: &TempDir) -> AppState {
    AppState::new(Arc::new(AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("socket addr"),
        log_level: "debug".to_string(),
        data_dir: dir.path().to_path_buf(),
        default_max_results: 10,
        search_timeout_secs: 30,
    }))
}

fn seed_two_stores(state: &AppState) {
    let stores: Vec<dishdb_core::Store> = serde_json::from_value(json!([
        {
            "nameStore": "Chez Ali",
            "url": "https://glovoapp.com/ma/fr/casablanca/chez-ali",
            "categories": [
                { "category": "Plats", "dishes": [{ "title": "Couscous", "price": "50,00 MAD" }] }
            ]
        },
        {
            "nameStore": "Sushi Box",
            "url": "https://glovoapp.com/ma/fr/casablanca/sushi-box",
            "categories": [
                { "category": "Makis", "dishes": [{ "title": "Plateau", "price": "60,00 MAD" }] },
                { "category": "Boissons", "dishes": [{ "title": "Eau", "price": "" }] }
            ]
        }
    ]))
    .expect("fixture stores");
    state.catalog.save(&stores).expect("seed catalog");
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

// ---------------------------------------------------------------------------
// Envelope and error mapping
// ---------------------------------------------------------------------------

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("not_found", StatusCode::NOT_FOUND),
        ("validation_error", StatusCode::BAD_REQUEST),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("timeout", StatusCode::GATEWAY_TIMEOUT),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "{code}");
    }
}

#[tokio::test]
async fn health_reports_store_count() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);

    let (status, json) = send(build_app(state), get_request("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["stores"], 2);
    assert!(json["meta"]["request_id"].is_string());
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_recommendations_returns_the_pair() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);

    let body = json!({ "budget": "120 MAD", "numPlates": 2 });
    let (status, json) = send(
        build_app(state),
        post_json("/api/v1/recommendations", &body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["algorithm"], "optimized");
    assert_eq!(data["statistics"]["total_combinations_found"], 1);
    assert_eq!(data["statistics"]["stores_count"], 2);
    assert_eq!(data["statistics"]["total_dishes_considered"], 3);
    assert_eq!(data["recommendations"][0]["total_price"], "110,00 MAD");
    assert_eq!(data["recommendations"][0]["residual"], "10,00 MAD");
}

#[tokio::test]
async fn post_accepts_numeric_budget_and_explicit_strategy() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);

    let body = json!({ "budget": 120, "numPlates": 1, "algorithm": "exact", "maxResults": 1 });
    let (status, json) = send(
        build_app(state),
        post_json("/api/v1/recommendations", &body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["algorithm"], "exact");
    let recommendations = json["data"]["recommendations"]
        .as_array()
        .expect("recommendations array");
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["total_price"], "60,00 MAD");
}

#[tokio::test]
async fn post_accepts_numeric_strings() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);

    let body = json!({ "budget": "120 MAD", "numPlates": "2", "maxResults": "5", "seed": "3" });
    let (status, json) = send(
        build_app(state),
        post_json("/api/v1/recommendations", &body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["numPlates"], 2);
    assert_eq!(json["data"]["recommendations"][0]["total_price"], "110,00 MAD");
}

#[tokio::test]
async fn get_recommendations_reads_query_parameters() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);

    let (status, json) = send(
        build_app(state),
        get_request("/api/v1/recommendations?budget=120%20MAD&plates=2&algorithm=greedy&max=3&seed=7"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["algorithm"], "greedy");
    assert_eq!(json["data"]["numPlates"], 2);
}

#[tokio::test]
async fn unknown_algorithm_falls_back_to_optimized() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);

    let (status, json) = send(
        build_app(state),
        get_request("/api/v1/recommendations?budget=120&plates=2&algorithm=quantum"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["algorithm"], "optimized");
}

#[tokio::test]
async fn impossible_request_returns_suggestions() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);

    let body = json!({ "budget": "120 MAD", "numPlates": 3 });
    let (status, json) = send(
        build_app(state),
        post_json("/api/v1/recommendations", &body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["recommendations"].is_null());
    assert_eq!(json["data"]["suggestions"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn missing_fields_are_validation_errors() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);
    let app = build_app(state);

    let cases = [
        post_json("/api/v1/recommendations", &json!({ "numPlates": 2 })),
        post_json("/api/v1/recommendations", &json!({ "budget": "120" })),
        post_json(
            "/api/v1/recommendations",
            &json!({ "budget": "120", "numPlates": 0 }),
        ),
        post_json(
            "/api/v1/recommendations",
            &json!({ "budget": "free", "numPlates": 2 }),
        ),
        post_json(
            "/api/v1/recommendations",
            &json!({ "budget": "120", "numPlates": "two" }),
        ),
        post_json(
            "/api/v1/recommendations",
            &json!({ "budget": "120", "numPlates": [2] }),
        ),
        post_json(
            "/api/v1/recommendations",
            &json!({ "budget": "120", "numPlates": 2, "maxResults": "many" }),
        ),
        get_request("/api/v1/recommendations?budget=120&plates=two"),
        get_request("/api/v1/recommendations?budget=120&plates=2&max=0"),
    ];

    for request in cases {
        let uri = request.uri().to_string();
        let (status, json) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"]["code"], "validation_error", "{uri}");
    }
}

#[tokio::test]
async fn empty_catalog_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);

    let body = json!({ "budget": "120 MAD", "numPlates": 2 });
    let (status, json) = send(
        build_app(state),
        post_json("/api/v1/recommendations", &body),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn price_stats_report_and_no_data() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);

    let (status, json) = send(
        build_app(state.clone()),
        get_request("/api/v1/recommendations/stats"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["message"], "No price data available");

    seed_two_stores(&state);
    let (status, json) = send(
        build_app(state),
        get_request("/api/v1/recommendations/stats"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_dishes"], 2);
    assert_eq!(json["data"]["price_range"]["avg"], "55,00 MAD");
    assert_eq!(json["data"]["percentiles"]["p50"], "60,00 MAD");
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_and_get_stores() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);
    let app = build_app(state);

    let (status, json) = send(app.clone(), get_request("/api/v1/stores")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_stores"], 2);
    assert_eq!(json["data"]["stores"][1]["nameStore"], "Sushi Box");

    let (status, json) = send(app.clone(), get_request("/api/v1/stores/sushi%20box")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["nameStore"], "Sushi Box");

    let (status, json) = send(app.clone(), get_request("/api/v1/stores/SUSHI%20BOX/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_categories"], 2);
    assert_eq!(json["data"]["total_dishes"], 2);
    assert_eq!(json["data"]["categories"][0]["category"], "Makis");

    let (status, json) = send(app, get_request("/api/v1/stores/Nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn delete_and_clear_stores() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir);
    seed_two_stores(&state);
    let app = build_app(state.clone());

    let (status, json) = send(app.clone(), delete_request("/api/v1/stores/chez%20ali")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_stores"], 1);

    let (status, _) = send(app.clone(), delete_request("/api/v1/stores/chez%20ali")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(app, delete_request("/api/v1/stores")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["cleared"], true);
    assert!(state.catalog.load().expect("load").is_empty());
}
