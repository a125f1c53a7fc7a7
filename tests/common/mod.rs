#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use recipe_catalog::app::build_app;
use recipe_catalog::ingest;
use recipe_catalog::state::AppState;

/// Small fixture in the shape of the production dataset, including the
/// non-standard `NaN` tokens it carries.
pub const FIXTURE: &str = r#"{
    "0": {"cuisine": "Desserts", "title": "Chocolate Cake", "rating": 4.7,
          "prep_time": 20, "cook_time": 35, "total_time": 55, "description": "Rich.",
          "nutrients": {"calories": "450 kcal", "proteinContent": "6 g"}, "serves": "12 servings"},
    "1": {"cuisine": "Desserts", "title": "Carrot Cake", "rating": 3.9,
          "prep_time": 25, "cook_time": 40, "total_time": 65, "description": "Spiced.",
          "nutrients": {"calories": "280 kcal"}, "serves": "10 servings"},
    "2": {"cuisine": "Desserts", "title": "Lemon Cake Bars", "rating": NaN,
          "prep_time": 15, "cook_time": NaN, "total_time": NaN, "description": null,
          "nutrients": {"calories": "190 kcal"}, "serves": "16"},
    "3": {"cuisine": "Soups", "title": "Tomato Soup", "rating": 4.9,
          "prep_time": 10, "cook_time": 30, "total_time": 40, "description": "Simple.",
          "nutrients": {"calories": "120 kcal"}, "serves": "4 servings"},
    "4": {"cuisine": "Breakfast", "title": "pancakes", "rating": 4.2,
          "prep_time": 5, "cook_time": 15, "total_time": 20, "description": "Fluffy.",
          "nutrients": {"calories": "250 kcal"}, "serves": "4 servings"},
    "5": {"cuisine": "Salads", "title": "Caesar Salad", "rating": 4.0,
          "prep_time": 15, "cook_time": 0, "total_time": 15, "description": "Crisp.",
          "nutrients": null, "serves": 2},
    "6": {"cuisine": "Desserts", "title": "Angel Food Cake", "rating": 4.4,
          "prep_time": 30, "cook_time": 40, "total_time": 70, "description": "Light.",
          "nutrients": {"calories": 140}, "serves": "12 servings"}
}"#;

pub const FIXTURE_ROWS: i64 = 7;

pub async fn seeded_state() -> AppState {
    let state = AppState::in_memory().await.expect("in-memory state");
    ingest::ingest_str(&state.db, FIXTURE)
        .await
        .expect("ingest fixture");
    state
}

pub async fn seeded_app() -> Router {
    build_app(seeded_state().await)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
