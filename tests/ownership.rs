mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestApp;

fn address(street: &str) -> Value {
    json!({
        "street": street,
        "number": "1234",
        "city": "Rosario",
        "country": "Argentina",
        "province": "Santa Fe",
        "postal_code": "2000",
    })
}

fn card(last4: &str, is_default: bool) -> Value {
    json!({
        "brand": "Visa",
        "last4": last4,
        "exp_month": 11,
        "exp_year": 2030,
        "is_default": is_default,
    })
}

#[tokio::test]
async fn addresses_are_scoped_to_their_owner() {
    let app = TestApp::spawn().await;
    let ana = app.signup("ana@example.com").await;
    let bob = app.signup("bob@example.com").await;

    let (status, created) = app.post("/addresses/me", Some(&ana), address("Cordoba")).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert!(created.get("client_id").is_none());

    let (_, bobs) = app.get("/addresses/me", Some(&bob)).await;
    assert_eq!(bobs, json!([]));

    let uri = format!("/addresses/me/{id}");
    let (status, _) = app.put(&uri, Some(&bob), json!({ "city": "Funes" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = app.put(&uri, Some(&ana), json!({ "city": "Funes" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Funes");
    assert_eq!(updated["street"], "Cordoba");

    let (status, _) = app.delete(&uri, Some(&ana)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&uri, Some(&ana)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn address_routes_require_a_session() {
    let app = TestApp::spawn().await;
    let (status, _) = app.get("/addresses/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.post("/addresses/me", None, address("Cordoba")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn concurrent_first_requests_share_one_client_record() {
    let app = TestApp::spawn().await;
    let token = app.signup("ana@example.com").await;

    let requests = (0..8).map(|_| app.request(Method::GET, "/addresses/me", Some(&token), None));
    let results = futures::future::join_all(requests).await;

    for (status, body) in results {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
    assert_eq!(app.count("clients").await, 1);
}

#[tokio::test]
async fn payment_methods_are_scoped_to_their_owner() {
    let app = TestApp::spawn().await;
    let ana = app.signup("ana@example.com").await;
    let bob = app.signup("bob@example.com").await;

    let (status, created) = app.post("/payment_methods", Some(&ana), card("4242", true)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (_, bobs) = app.get("/payment_methods", Some(&bob)).await;
    assert_eq!(bobs, json!([]));

    let uri = format!("/payment_methods/{id}");
    let (status, _) = app.put(&uri, Some(&bob), json!({ "brand": "Amex" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, mine) = app.get("/payment_methods", Some(&ana)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&uri, Some(&ana)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn one_default_payment_method_at_a_time() {
    let app = TestApp::spawn().await;
    let token = app.signup("ana@example.com").await;

    let (_, first) = app.post("/payment_methods", Some(&token), card("1111", true)).await;
    let (_, second) = app.post("/payment_methods", Some(&token), card("2222", true)).await;
    assert_eq!(second["is_default"], true);

    let defaults = |methods: &Value| -> Vec<String> {
        methods
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["is_default"] == true)
            .map(|m| m["last4"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, methods) = app.get("/payment_methods", Some(&token)).await;
    assert_eq!(defaults(&methods), vec!["2222"]);

    let uri = format!("/payment_methods/{}", first["id"]);
    let (status, _) = app.put(&uri, Some(&token), json!({ "is_default": true })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, methods) = app.get("/payment_methods", Some(&token)).await;
    assert_eq!(defaults(&methods), vec!["1111"]);
}

#[tokio::test]
async fn expired_or_malformed_cards_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.signup("ana@example.com").await;

    // The test clock sits in January 2026.
    let mut expired = card("4242", false);
    expired["exp_month"] = json!(12);
    expired["exp_year"] = json!(2025);
    let (status, _) = app.post("/payment_methods", Some(&token), expired).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut this_month = card("4242", false);
    this_month["exp_month"] = json!(1);
    this_month["exp_year"] = json!(2026);
    let (status, created) = app.post("/payment_methods", Some(&token), this_month).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/payment_methods/{}", created["id"]);
    let (status, _) = app
        .put(&uri, Some(&token), json!({ "exp_year": 2025 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/payment_methods", Some(&token), card("42a2", false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.post("/payment_methods", Some(&token), card("424", false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn a_card_that_has_expired_cannot_be_updated() {
    let app = TestApp::spawn().await;
    let token = app.signup("ana@example.com").await;

    let mut january = card("4242", false);
    january["exp_month"] = json!(1);
    january["exp_year"] = json!(2026);
    let (status, created) = app.post("/payment_methods", Some(&token), january).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/payment_methods/{}", created["id"]);

    app.clock.advance(chrono::Duration::days(60));
    let token = app.login("ana@example.com").await;

    let (status, body) = app
        .put(&uri, Some(&token), json!({ "is_default": true }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Card is expired");

    let (status, renewed) = app
        .put(&uri, Some(&token), json!({ "exp_year": 2029, "is_default": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renewed["is_default"], true);
}

#[tokio::test]
async fn malformed_ids_get_a_json_error() {
    let app = TestApp::spawn().await;
    let token = app.signup("ana@example.com").await;

    let (status, body) = app.delete("/addresses/me/abc", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .put("/payment_methods/abc", Some(&token), json!({ "brand": "Amex" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
