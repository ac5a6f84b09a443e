mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn catalog_reads_are_public_and_writes_need_an_admin() {
    let app = TestApp::spawn().await;
    let customer = app.signup("ana@example.com").await;
    let admin = app.admin_token("admin@example.com").await;

    let (status, _) = app.post("/categories", None, json!({ "name": "Buzos" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .post("/categories", Some(&customer), json!({ "name": "Buzos" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, category) = app
        .post("/categories", Some(&admin), json!({ "name": "Buzos" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();

    let (status, product) = app
        .post(
            "/products",
            Some(&admin),
            json!({ "name": "Buzo Hoodie", "price": 39999.0, "stock": 5, "category_id": category_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_uri = format!("/products/{}", product["id"]);

    let (status, listed) = app.get("/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (status, shown) = app.get(&product_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["name"], "Buzo Hoodie");

    let (status, updated) = app
        .put(
            &product_uri,
            Some(&admin),
            json!({ "name": "Buzo Hoodie", "price": 35999.0, "stock": 4, "category_id": category_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 35999.0);

    let (status, _) = app.delete(&product_uri, Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&product_uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&product_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn catalog_paging_and_validation() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token("admin@example.com").await;
    for name in ["Remeras", "Buzos", "Gorras"] {
        app.post("/categories", Some(&admin), json!({ "name": name })).await;
    }

    let (_, page) = app.get("/categories?skip=1&limit=1", None).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["name"], "Buzos");

    let (status, body) = app.get("/categories?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    let (status, body) = app.get("/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .post(
            "/products",
            Some(&admin),
            json!({ "name": "Gratis", "price": 0.0, "category_id": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/products",
            Some(&admin),
            json!({ "name": "Huerfano", "price": 10.0, "category_id": 999 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_referenced_category_conflicts() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token("admin@example.com").await;
    let product = app.seed_product("Remera", 100.0).await;
    let (category_id,): (i64,) = sqlx::query_as("SELECT category_id FROM products WHERE id = ?")
        .bind(product)
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let (status, body) = app
        .delete(&format!("/categories/{category_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

const BOUNDARY: &str = "shop-api-test-boundary";

fn multipart_upload(token: &str, content_type: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/uploads/products")
        .header(header::HOST, "shop.test")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn image_uploads_are_stored_and_served() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token("admin@example.com").await;

    let (status, body) = app
        .send(multipart_upload(&admin, "image/png", "Remera.PNG", b"\x89PNG fake image"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let url = body["url"].as_str().unwrap();
    let filename = url
        .strip_prefix("http://shop.test/uploads/")
        .expect("url built from the Host header");
    assert!(filename.ends_with(".png"));
    let stored = std::fs::read(app.uploads_dir.join(filename)).unwrap();
    assert_eq!(stored, b"\x89PNG fake image");

    let served = app
        .send(
            Request::builder()
                .uri(format!("/uploads/{filename}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(served.0, StatusCode::OK);
}

#[tokio::test]
async fn uploads_reject_non_images_empty_files_and_customers() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token("admin@example.com").await;
    let customer = app.signup("ana@example.com").await;

    let (status, _) = app
        .send(multipart_upload(&admin, "text/plain", "notes.txt", b"hello"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(multipart_upload(&admin, "image/jpeg", "empty.jpg", b""))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(multipart_upload(&customer, "image/png", "a.png", b"png"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = std::fs::read_dir(&app.uploads_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);
}
