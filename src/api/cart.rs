use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, CartDto};
use crate::domain::policy::{self, Action, Resource};

// ============================================================================
// Request Types
// ============================================================================

const fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub producto_id: i32,
    #[serde(default = "default_quantity")]
    pub cantidad: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub item_id: i32,
    pub cantidad: i32,
}

fn require_buyer(auth: AuthUser) -> Result<(), ApiError> {
    if policy::can(auth.actor(), Action::ManageCart, &Resource::None) {
        Ok(())
    } else {
        Err(ApiError::forbidden_role(auth.role.as_str()))
    }
}

// ============================================================================
// Handlers (role=comprador)
// ============================================================================

/// GET /api/cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    require_buyer(auth)?;

    let cart = state.cart_service().get_cart(auth.id).await?;

    Ok(Json(ApiResponse::success(CartDto::from(cart))))
}

/// POST /api/cart/add
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    require_buyer(auth)?;
    let product_id = validate_id(payload.producto_id, "product")?;

    let cart = state
        .cart_service()
        .add_item(auth.id, product_id, payload.cantidad)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Producto agregado al carrito",
        CartDto::from(cart),
    )))
}

/// PUT /api/cart/update
pub async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    require_buyer(auth)?;

    let cart = state
        .cart_service()
        .update_item(auth.id, payload.item_id, payload.cantidad)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Cantidad actualizada",
        CartDto::from(cart),
    )))
}

/// DELETE /api/cart/remove/{itemId}
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<i32>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    require_buyer(auth)?;

    let cart = state.cart_service().remove_item(auth.id, item_id).await?;

    Ok(Json(ApiResponse::with_message(
        "Producto eliminado del carrito",
        CartDto::from(cart),
    )))
}

/// DELETE /api/cart/clear
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    require_buyer(auth)?;

    let cart = state.cart_service().clear(auth.id).await?;

    Ok(Json(ApiResponse::with_message(
        "Carrito vaciado",
        CartDto::from(cart),
    )))
}
