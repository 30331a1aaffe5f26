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

async fn add_to_cart(app: &Router, token: &str, product_id: i64, quantity: i32) {
    let (status, body) = request(
        app,
        "POST",
        "/api/cart/add",
        Some(token),
        Some(json!({"productoId": product_id, "cantidad": quantity})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add to cart failed: {body}");
}

async fn checkout(app: &Router, token: &str) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        "/api/orders",
        Some(token),
        Some(json!({
            "direccionEntrega": {
                "calle": "Av. Juárez 10",
                "ciudad": "Oaxaca",
                "codigoPostal": "68000",
            },
            "metodoPago": "efectivo",
        })),
    )
    .await
}

async fn product_stock(app: &Router, product_id: i64) -> i64 {
    let (status, body) =
        request(app, "GET", &format!("/api/products/{product_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["cantidad"].as_i64().unwrap()
}

#[tokio::test]
async fn empty_cart_checkout_is_rejected() {
    let app = spawn_app().await;
    register(&app, "María", "maria@campo.mx", "agricultor").await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    let (status, body) = checkout(&app, &buyer).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "El carrito está vacío");

    // no order document was produced
    let (_, body) = request(&app, "GET", "/api/orders/mis-pedidos", Some(&buyer), None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn checkout_snapshots_the_cart_and_decrements_stock() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.5, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_id, 4).await;

    let (status, body) = checkout(&app, &buyer).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let order = &body["data"];
    assert_eq!(order["estado"], "pendiente");
    assert_eq!(order["total"], 10.0);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["cantidad"], 4);
    assert_eq!(order["items"][0]["precio"], 2.5);
    assert_eq!(order["items"][0]["subtotal"], 10.0);
    assert_eq!(order["items"][0]["nombre"], "Jitomate");
    assert_eq!(order["direccionEntrega"]["ciudad"], "Oaxaca");
    assert!(order["fechaEntregaEstimada"].as_str().is_some());

    // stock went from 10 to 6
    assert_eq!(product_stock(&app, product_id).await, 6);

    // the cart was emptied, not deleted
    let (status, body) = request(&app, "GET", "/api/cart", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["total"], 0.0);
}

#[tokio::test]
async fn failing_line_aborts_the_whole_checkout() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_a = create_product(&app, &farmer, "Jitomate", 2.0, 5).await;
    let product_b = create_product(&app, &farmer, "Aguacate", 8.0, 2).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_a, 3).await;
    add_to_cart(&app, &buyer, product_b, 2).await;

    // the farmer sells product B elsewhere; only 1 left now
    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/products/{product_b}"),
        Some(&farmer),
        Some(json!({"cantidad": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = checkout(&app, &buyer).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("Aguacate"),
        "shortfall product should be named: {body}"
    );

    // nothing was decremented, the cart is intact
    assert_eq!(product_stock(&app, product_a).await, 5);
    assert_eq!(product_stock(&app, product_b).await, 1);
    let (_, body) = request(&app, "GET", "/api/cart", Some(&buyer), None).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn cancel_restores_exactly_what_checkout_took() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.5, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_id, 4).await;
    let (_, body) = checkout(&app, &buyer).await;
    let order_id = body["data"]["id"].as_i64().unwrap();

    assert_eq!(product_stock(&app, product_id).await, 6);

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/cancelar"),
        Some(&buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["estado"], "cancelado");

    // round-trip: stock is back where it started
    assert_eq!(product_stock(&app, product_id).await, 10);

    // a cancelled order cannot be cancelled again
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/cancelar"),
        Some(&buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("cancelado"));
    assert_eq!(product_stock(&app, product_id).await, 10);
}

#[tokio::test]
async fn only_the_buyer_may_cancel() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.5, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;
    let other_buyer = register(&app, "Ana", "ana@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_id, 1).await;
    let (_, body) = checkout(&app, &buyer).await;
    let order_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/cancelar"),
        Some(&other_buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/cancelar"),
        Some(&farmer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn status_machine_is_forward_only() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.5, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_id, 2).await;
    let (_, body) = checkout(&app, &buyer).await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    let estado_uri = format!("/api/orders/{order_id}/estado");

    let set = |estado: &'static str| {
        let app = &app;
        let farmer = &farmer;
        let uri = estado_uri.clone();
        async move { request(app, "PUT", &uri, Some(farmer), Some(json!({"estado": estado}))).await }
    };

    // skipping ahead from pendiente is rejected
    let (status, _) = set("enviado").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = set("confirmado").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["estado"], "confirmado");

    // no going back
    let (status, _) = set("pendiente").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = set("en_proceso").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = set("enviado").await;
    assert_eq!(status, StatusCode::OK);

    // shipped orders can no longer be cancelled
    let (status, _) = set("cancelado").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = set("entregado").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["estado"], "entregado");

    // delivered is terminal; a cancelled order cannot be resurrected either
    let (status, _) = set("cancelado").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown values are a validation error
    let (status, _) = set("devuelto").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn farmer_cancellation_also_restores_stock() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.5, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_id, 3).await;
    let (_, body) = checkout(&app, &buyer).await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(product_stock(&app, product_id).await, 7);

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/estado"),
        Some(&farmer),
        Some(json!({"estado": "cancelado"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["estado"], "cancelado");
    assert_eq!(product_stock(&app, product_id).await, 10);
}

#[tokio::test]
async fn uninvolved_farmers_cannot_touch_or_see_the_order() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.5, 10).await;
    let outsider = register(&app, "Pedro", "pedro@campo.mx", "agricultor").await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_id, 1).await;
    let (_, body) = checkout(&app, &buyer).await;
    let order_id = body["data"]["id"].as_i64().unwrap();

    // no item of theirs in the order: every state value is forbidden
    for estado in ["confirmado", "cancelado", "entregado"] {
        let (status, _) = request(
            &app,
            "PUT",
            &format!("/api/orders/{order_id}/estado"),
            Some(&outsider),
            Some(json!({"estado": estado})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "estado {estado}");
    }

    // and the detail view is closed to them too
    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/orders/{order_id}"),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // while the involved farmer and the buyer can read it
    for token in [&farmer, &buyer] {
        let (status, _) = request(
            &app,
            "GET",
            &format!("/api/orders/{order_id}"),
            Some(token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn multi_producer_orders_tag_each_item_with_its_owner() {
    let app = spawn_app().await;
    let farmer_a = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let farmer_b = register(&app, "Juan", "juan@campo.mx", "agricultor").await;
    let farmer_c = register(&app, "Pedro", "pedro@campo.mx", "agricultor").await;
    let product_a = create_product(&app, &farmer_a, "Jitomate", 2.0, 10).await;
    let product_b = create_product(&app, &farmer_b, "Aguacate", 8.0, 10).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_a, 2).await;
    add_to_cart(&app, &buyer, product_b, 1).await;
    let (status, body) = checkout(&app, &buyer).await;
    assert_eq!(status, StatusCode::CREATED);

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let owners: Vec<i64> = items
        .iter()
        .map(|item| item["agricultorId"].as_i64().unwrap())
        .collect();
    assert_ne!(owners[0], owners[1]);

    // both producers see the order in their received list
    for farmer in [&farmer_a, &farmer_b] {
        let (status, body) =
            request(&app, "GET", "/api/orders/agricultor", Some(farmer), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
    }

    // an unrelated producer does not
    let (status, body) =
        request(&app, "GET", "/api/orders/agricultor", Some(&farmer_c), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn farmer_stats_aggregate_only_their_items() {
    let app = spawn_app().await;
    let farmer_a = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let farmer_b = register(&app, "Juan", "juan@campo.mx", "agricultor").await;
    let product_a = create_product(&app, &farmer_a, "Jitomate", 2.0, 20).await;
    let product_b = create_product(&app, &farmer_b, "Aguacate", 8.0, 20).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    // first order: 2 × A + 1 × B
    add_to_cart(&app, &buyer, product_a, 2).await;
    add_to_cart(&app, &buyer, product_b, 1).await;
    let (status, _) = checkout(&app, &buyer).await;
    assert_eq!(status, StatusCode::CREATED);

    // second order: 3 × A, then confirmed by the farmer
    add_to_cart(&app, &buyer, product_a, 3).await;
    let (_, body) = checkout(&app, &buyer).await;
    let second_order = body["data"]["id"].as_i64().unwrap();
    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/orders/{second_order}/estado"),
        Some(&farmer_a),
        Some(json!({"estado": "confirmado"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "GET",
        "/api/orders/agricultor/stats",
        Some(&farmer_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 2×2.0 + 3×2.0 of Jitomate, B's avocados are not counted
    assert_eq!(body["data"]["totalVentas"], 10.0);
    assert_eq!(body["data"]["totalProductos"], 1);
    assert_eq!(body["data"]["totalPedidos"], 2);
    assert_eq!(body["data"]["pedidosPendientes"], 1);

    let (status, body) = request(
        &app,
        "GET",
        "/api/orders/agricultor/stats",
        Some(&farmer_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalVentas"], 8.0);
    assert_eq!(body["data"]["totalPedidos"], 1);

    // buyers have no stats endpoint
    let (status, _) = request(
        &app,
        "GET",
        "/api/orders/agricultor/stats",
        Some(&buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn buyers_see_their_orders_newest_first() {
    let app = spawn_app().await;
    let farmer = register(&app, "María", "maria@campo.mx", "agricultor").await;
    let product_id = create_product(&app, &farmer, "Jitomate", 2.0, 20).await;
    let buyer = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    add_to_cart(&app, &buyer, product_id, 1).await;
    let (_, body) = checkout(&app, &buyer).await;
    let first = body["data"]["id"].as_i64().unwrap();

    add_to_cart(&app, &buyer, product_id, 2).await;
    let (_, body) = checkout(&app, &buyer).await;
    let second = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(&app, "GET", "/api/orders/mis-pedidos", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["id"].as_i64().unwrap(), second);
    assert_eq!(body["data"][1]["id"].as_i64().unwrap(), first);

    // an unknown order id is a 404
    let (status, _) = request(&app, "GET", "/api/orders/9999", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
