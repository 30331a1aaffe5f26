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

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = spawn_app().await;

    let (status, body) = request(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_routes_return_envelope_404() {
    let app = spawn_app().await;

    let (status, body) = request(&app, "GET", "/api/no-such-route", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Ruta no encontrada");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = spawn_app().await;

    let (status, _) = request(&app, "GET", "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/auth/profile", Some("wrong-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_profile_round_trip() {
    let app = spawn_app().await;

    let token = register(&app, "María Campos", "maria@campo.mx", "agricultor").await;

    let (status, body) = request(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "maria@campo.mx");
    assert_eq!(body["data"]["rol"], "agricultor");

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "maria@campo.mx", "password": "secreta123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].as_str().is_some());

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "maria@campo.mx", "password": "incorrecta"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn emails_are_unique_and_normalized() {
    let app = spawn_app().await;

    register(&app, "María", "maria@campo.mx", "agricultor").await;

    // Same address with different case and padding is still a duplicate
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "nombre": "Otra María",
            "email": "  MARIA@campo.mx ",
            "password": "secreta123",
            "rol": "comprador",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "El usuario ya existe");
}

#[tokio::test]
async fn register_rejects_unknown_roles_and_short_passwords() {
    let app = spawn_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "nombre": "X",
            "email": "x@y.mx",
            "password": "secreta123",
            "rol": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "nombre": "X",
            "email": "x@y.mx",
            "password": "corta",
            "rol": "comprador",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let app = spawn_app().await;
    let token = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    let (status, _) = request(
        &app,
        "PUT",
        "/api/users/change-password",
        Some(&token),
        Some(json!({"currentPassword": "equivocada", "newPassword": "nueva1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app,
        "PUT",
        "/api/users/change-password",
        Some(&token),
        Some(json!({"currentPassword": "secreta123", "newPassword": "nueva1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "luis@campo.mx", "password": "nueva1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_updates_are_partial() {
    let app = spawn_app().await;
    let token = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    let (status, body) = request(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({"telefono": "555-0101"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["telefono"], "555-0101");
    assert_eq!(body["data"]["nombre"], "Luis");
}

#[tokio::test]
async fn forgot_password_does_not_leak_account_existence() {
    let app = spawn_app().await;
    register(&app, "Luis", "luis@campo.mx", "comprador").await;

    let (status_known, body_known) = request(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({"email": "luis@campo.mx"})),
    )
    .await;
    let (status_unknown, body_unknown) = request(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({"email": "nadie@campo.mx"})),
    )
    .await;

    assert_eq!(status_known, StatusCode::OK);
    assert_eq!(status_unknown, StatusCode::OK);
    assert_eq!(body_known["data"]["message"], body_unknown["data"]["message"]);
}

#[tokio::test]
async fn reset_password_rejects_unknown_codes() {
    let app = spawn_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({"token": "0000000000", "password": "nueva1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_account_revokes_access() {
    let app = spawn_app().await;
    let token = register(&app, "Luis", "luis@campo.mx", "comprador").await;

    let (status, _) = request(
        &app,
        "DELETE",
        "/api/users/delete-account",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
