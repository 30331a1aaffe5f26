use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CartService, Mailer, OrderService, SeaOrmAuthService, SeaOrmCartService,
    SeaOrmOrderService,
};

pub mod auth;
mod cart;
mod error;
mod observability;
mod orders;
mod products;
mod system;
mod types;
mod users;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    store: Store,

    auth_service: Arc<dyn AuthService>,

    cart_service: Arc<dyn CartService>,

    order_service: Arc<dyn OrderService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &dyn AuthService {
        self.auth_service.as_ref()
    }

    #[must_use]
    pub fn cart_service(&self) -> &dyn CartService {
        self.cart_service.as_ref()
    }

    #[must_use]
    pub fn order_service(&self) -> &dyn OrderService {
        self.order_service.as_ref()
    }
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let mailer = if config.email.enabled {
        Some(Arc::new(
            Mailer::new(&config.email)
                .map_err(|e| anyhow::anyhow!("Failed to build SMTP transport: {e}"))?,
        ))
    } else {
        None
    };

    let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
        mailer,
    ));
    let cart_service: Arc<dyn CartService> = Arc::new(SeaOrmCartService::new(store.clone()));
    let order_service: Arc<dyn OrderService> = Arc::new(SeaOrmOrderService::new(store.clone()));

    Ok(Arc::new(AppState {
        config: Arc::new(RwLock::new(config)),
        store,
        auth_service,
        cart_service,
        order_service,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies) = {
        let config = state.config.read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(60)));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(system::welcome))
        .nest("/api", api_router)
        .fallback(not_found)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/profile", get(auth::get_profile))
        .route("/auth/logout", post(auth::logout))
        .route("/users/profile", put(users::update_profile))
        .route("/users/change-password", put(users::change_password))
        .route("/users/delete-account", delete(users::delete_account))
        .route("/products", post(products::create_product))
        .route(
            "/products/agricultor/mis-productos",
            get(products::my_products),
        )
        .route("/products/{id}", put(products::update_product))
        .route("/products/{id}", delete(products::delete_product))
        .route(
            "/products/{id}/toggle-disponibilidad",
            patch(products::toggle_availability),
        )
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add_to_cart))
        .route("/cart/update", put(cart::update_cart_item))
        .route("/cart/remove/{item_id}", delete(cart::remove_from_cart))
        .route("/cart/clear", delete(cart::clear_cart))
        .route("/orders", post(orders::create_order))
        .route("/orders/mis-pedidos", get(orders::my_orders))
        .route("/orders/agricultor", get(orders::farmer_orders))
        .route("/orders/agricultor/stats", get(orders::farmer_stats))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/cancelar", put(orders::cancel_order))
        .route("/orders/{id}/estado", put(orders::update_order_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

async fn not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure("Ruta no encontrada")),
    )
}
