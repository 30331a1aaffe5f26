use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub uptime: u64,
}

/// GET /api/health (public)
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub auth: &'static str,
    pub products: &'static str,
    pub users: &'static str,
    pub cart: &'static str,
    pub orders: &'static str,
}

/// GET / (public)
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Bienvenido a la API de Cosecha",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            auth: "/api/auth",
            products: "/api/products",
            users: "/api/users",
            cart: "/api/cart",
            orders: "/api/orders",
        },
    })
}
