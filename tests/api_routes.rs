use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use subsidy_engine::api::build_router;
use subsidy_engine::rates::{ScheduleRegistry, BUNDLED_EDITION};
use tower::ServiceExt;

fn router() -> axum::Router {
    build_router(ScheduleRegistry::with_bundled().expect("bundled registry"))
}

fn order() -> Value {
    json!({
        "housing_type": "house",
        "region": "standard",
        "household_size": 1,
        "reference_income": 15000.0,
        "property_age_years": 40,
        "primary_residence": true,
        "configuration": {
            "project": "roof_insulation",
            "surface_m2": 100.0,
            "custom_unit_price": 60.0
        }
    })
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn estimate_returns_the_calculation_result() {
    let (status, body) = post("/api/estimate", order()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edition"], BUNDLED_EDITION);
    assert_eq!(body["bracket"], "very_modest");
    assert_eq!(body["eligible"], true);
    assert_eq!(body["amounts"]["primary_grant"], 2500);
    assert_eq!(body["amounts"]["certificate_credit"], 1000);
}

#[tokio::test]
async fn ineligible_orders_are_not_errors() {
    let mut order = order();
    order["property_age_years"] = json!(5);
    let (status, body) = post("/api/estimate", order).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eligible"], false);
    assert_eq!(body["bracket"], "not_eligible");
    assert_eq!(body["advisories"][0]["kind"], "property_too_recent");
}

#[tokio::test]
async fn unknown_edition_is_not_found() {
    let (status, body) = post("/api/estimate?edition=1999-01", order()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("1999-01"));
}

#[tokio::test]
async fn batch_estimates_keep_request_order() {
    let mut second = order();
    second["reference_income"] = json!(90000.0);
    let (status, body) = post("/api/estimate/batch", json!([order(), second])).await;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().expect("array of results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["bracket"], "very_modest");
    assert_eq!(results[1]["bracket"], "higher");
    assert_eq!(results[1]["amounts"]["primary_grant"], 0);
}

#[tokio::test]
async fn lists_available_schedules() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/api/schedules")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["default"], BUNDLED_EDITION);
    assert_eq!(body["editions"], json!([BUNDLED_EDITION]));
}
