use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, DeliveryAddressDto, FarmerStatsDto, OrderDto};
use crate::domain::policy::{self, Action, Resource};
use crate::models::order::{OrderStatus, PaymentMethod};
use crate::services::CheckoutInput;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub direccion_entrega: Option<DeliveryAddressDto>,
    pub metodo_pago: Option<String>,
    pub notas: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub estado: String,
}

fn require(auth: AuthUser, action: Action) -> Result<(), ApiError> {
    if policy::can(auth.actor(), action, &Resource::None) {
        Ok(())
    } else {
        Err(ApiError::forbidden_role(auth.role.as_str()))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/orders (role=comprador) — checkout
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDto>>), ApiError> {
    require(auth, Action::PlaceOrder)?;

    let payment_method = match payload.metodo_pago.as_deref() {
        None => PaymentMethod::default(),
        Some(s) => PaymentMethod::parse(s)
            .ok_or_else(|| ApiError::validation(format!("Método de pago no válido: {s}")))?,
    };

    let order = state
        .order_service()
        .checkout(
            auth.actor(),
            CheckoutInput {
                delivery: payload.direccion_entrega.unwrap_or_default().into(),
                payment_method,
                notes: payload.notas,
            },
        )
        .await?;

    let body = ApiResponse::with_message("Pedido creado exitosamente", OrderDto::from(order));

    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/orders/mis-pedidos (role=comprador)
pub async fn my_orders(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    require(auth, Action::ViewOwnOrders)?;

    let orders = state.order_service().list_for_buyer(auth.actor()).await?;

    Ok(Json(ApiResponse::list(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

/// GET /api/orders/{id} — buyer of the order or a farmer owning one of its
/// items
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = validate_id(id, "order")?;

    let order = state.order_service().get(auth.actor(), id).await?;

    Ok(Json(ApiResponse::success(OrderDto::from(order))))
}

/// PUT /api/orders/{id}/cancelar (role=comprador)
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = validate_id(id, "order")?;

    let order = state.order_service().cancel(auth.actor(), id).await?;

    Ok(Json(ApiResponse::with_message(
        "Pedido cancelado exitosamente",
        OrderDto::from(order),
    )))
}

/// PUT /api/orders/{id}/estado (role=agricultor)
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = validate_id(id, "order")?;

    let status = OrderStatus::parse(&payload.estado)
        .ok_or_else(|| ApiError::validation(format!("Estado no válido: {}", payload.estado)))?;

    let order = state
        .order_service()
        .update_status(auth.actor(), id, status)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Estado actualizado",
        OrderDto::from(order),
    )))
}

/// GET /api/orders/agricultor (role=agricultor) — received orders
pub async fn farmer_orders(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    require(auth, Action::ViewReceivedOrders)?;

    let orders = state.order_service().list_for_farmer(auth.actor()).await?;

    Ok(Json(ApiResponse::list(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

/// GET /api/orders/agricultor/stats (role=agricultor)
pub async fn farmer_stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<FarmerStatsDto>>, ApiError> {
    require(auth, Action::ViewReceivedOrders)?;

    let stats = state.order_service().farmer_stats(auth.actor()).await?;

    Ok(Json(ApiResponse::success(FarmerStatsDto::from(stats))))
}
