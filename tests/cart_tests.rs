use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cosecha::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = cosecha::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    cosecha::api::router(state).await
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

async fn register(app: &Router, name: &str, email: &str, role: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "nombre": name,
            "email": email,
            "password": "secreta123",
            "rol": role,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, token: &str, name: &str, price: f64, stock: i32) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/api/products",
        Some(token),
        Some(json!({
            "nombre": name,
            "descripcion": "Cosecha de temporada",
            "precio": price,
            "cantidad": stock,
            "categoria": "verduras",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "create product failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}

/// Farmer with one product plus a buyer; returns (buyer token, product id).
async fn seed_catalog(app: &Router, price: f64, stock: i32) -> (String, i64) {
    let farmer = register(app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(app, &farmer, "Jitomate", price, stock).await;
    let buyer = register(app, "Luis", "luis@campo.mx", "comprador").await;
    (buyer, product_id)
}

#[tokio::test]
async fn cart_is_created_lazily_and_empty() {
    let app = spawn_app().await;
    let (buyer, _) = seed_catalog(&app, 2.5, 10).await;

    let (status, body) = request(&app, "GET", "/api/cart", Some(&buyer), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["total"], 0.0);
}

#[tokio::test]
async fn cart_endpoints_reject_farmers() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;

    let (status, _) = request(&app, "GET", "/api/cart", Some(&farmer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn add_merges_quantities_and_guards_stock() {
    let app = spawn_app().await;
    let (buyer, product_id) = seed_catalog(&app, 2.5, 10).await;

    // stock=10: add 4 passes, the cart totals 4 × price
    let (status, body) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": product_id, "cantidad": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["cantidad"], 4);
    assert_eq!(body["data"]["total"], 10.0);

    // add 7 more (cumulative 11) fails and leaves the cart untouched
    let (status, body) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": product_id, "cantidad": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("10"),
        "message should name the available stock: {body}"
    );

    let (_, body) = request(&app, "GET", "/api/cart", Some(&buyer), None).await;
    assert_eq!(body["data"]["items"][0]["cantidad"], 4);
    assert_eq!(body["data"]["total"], 10.0);
}

#[tokio::test]
async fn add_rejects_missing_or_unavailable_products() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.5, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": 9999, "cantidad": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/products/{product_id}/toggle-disponibilidad"),
        Some(&farmer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": product_id, "cantidad": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Este producto no está disponible");
}

#[tokio::test]
async fn update_rechecks_stock_and_recomputes_total() {
    let app = spawn_app().await;
    let (buyer, product_id) = seed_catalog(&app, 3.0, 5).await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": product_id, "cantidad": 2})),
    )
    .await;
    let item_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "PUT",
        "/api/cart/update",
        Some(&buyer),
        Some(json!({"itemId": item_id, "cantidad": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 15.0);

    // over stock: rejected, prior state kept
    let (status, _) = request(
        &app,
        "PUT",
        "/api/cart/update",
        Some(&buyer),
        Some(json!({"itemId": item_id, "cantidad": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = request(&app, "GET", "/api/cart", Some(&buyer), None).await;
    assert_eq!(body["data"]["items"][0]["cantidad"], 5);
    assert_eq!(body["data"]["total"], 15.0);

    // zero quantity is a validation error
    let (status, _) = request(
        &app,
        "PUT",
        "/api/cart/update",
        Some(&buyer),
        Some(json!({"itemId": item_id, "cantidad": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown item
    let (status, _) = request(
        &app,
        "PUT",
        "/api/cart/update",
        Some(&buyer),
        Some(json!({"itemId": 9999, "cantidad": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remove_is_idempotent_and_clear_zeroes_the_total() {
    let app = spawn_app().await;
    let (buyer, product_id) = seed_catalog(&app, 2.0, 10).await;

    // clearing before any cart exists is a 404
    let (status, _) = request(&app, "DELETE", "/api/cart/clear", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": product_id, "cantidad": 3})),
    )
    .await;
    let item_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/api/cart/remove/{item_id}"),
        Some(&buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["total"], 0.0);

    // removing the same item again is a no-op, not an error
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/cart/remove/{item_id}"),
        Some(&buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": product_id, "cantidad": 2})),
    )
    .await;

    let (status, body) = request(&app, "DELETE", "/api/cart/clear", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["total"], 0.0);
}

#[tokio::test]
async fn captured_price_survives_catalog_changes() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.0, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    let (_, _) = request(
        &app,
        "POST",
        "/api/cart/add",
        Some(&buyer),
        Some(json!({"productoId": product_id, "cantidad": 2})),
    )
    .await;

    // the farmer raises the price afterwards
    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/products/{product_id}"),
        Some(&farmer),
        Some(json!({"precio": 9.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // the cart line keeps the captured price and the total reflects it
    let (_, body) = request(&app, "GET", "/api/cart", Some(&buyer), None).await;
    assert_eq!(body["data"]["items"][0]["precio"], 2.0);
    assert_eq!(body["data"]["total"], 4.0);
    // while the embedded product summary shows the live price
    assert_eq!(body["data"]["items"][0]["producto"]["precio"], 9.0);
}
