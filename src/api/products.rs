use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::{
    validate_description, validate_id, validate_name, validate_price, validate_stock,
};
use super::{ApiError, ApiResponse, AppState, ProductDto};
use crate::domain::policy::{self, Action, Resource};
use crate::models::product::{Category, NewProduct, ProductFilter, ProductPatch, Unit};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct ProductQuery {
    pub categoria: Option<String>,
    pub search: Option<String>,
    pub disponible: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,
    #[serde(default)]
    pub cantidad: i32,
    pub unidad: Option<String>,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub ubicacion: Option<String>,
    pub fecha_cosecha: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub precio: Option<f64>,
    pub cantidad: Option<i32>,
    pub unidad: Option<String>,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub disponible: Option<bool>,
    pub ubicacion: Option<String>,
    pub fecha_cosecha: Option<String>,
}

fn parse_unit(value: Option<&str>) -> Result<Option<Unit>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) => Unit::parse(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("Unidad no válida: {s}"))),
    }
}

fn parse_category(value: Option<&str>) -> Result<Option<Category>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) => Category::parse(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("Categoría no válida: {s}"))),
    }
}

/// Fetch a product and verify the acting farmer owns it.
async fn owned_product(
    state: &AppState,
    auth: AuthUser,
    id: i32,
) -> Result<i32, ApiError> {
    let product = state
        .store()
        .get_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Producto no encontrado"))?;

    let resource = Resource::Product {
        owner_id: product.farmer_id,
    };
    if !policy::can(auth.actor(), Action::MutateProduct, &resource) {
        return Err(ApiError::Forbidden(
            "No tienes permiso para modificar este producto".to_string(),
        ));
    }

    Ok(product.id)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/products (public)
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let filter = ProductFilter {
        category: parse_category(query.categoria.as_deref())?,
        search: query.search.filter(|s| !s.trim().is_empty()),
        available: query.disponible.unwrap_or(true),
    };

    let products = state.store().list_products(&filter).await?;

    Ok(Json(ApiResponse::list(
        products.into_iter().map(ProductDto::from).collect(),
    )))
}

/// GET /api/products/{id} (public)
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id(id, "product")?;

    let product = state
        .store()
        .get_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Producto no encontrado"))?;

    Ok(Json(ApiResponse::success(ProductDto::from(product))))
}

/// GET /api/products/agricultor/mis-productos
pub async fn my_products(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let products = state.store().list_farmer_products(auth.id).await?;

    Ok(Json(ApiResponse::list(
        products.into_iter().map(ProductDto::from).collect(),
    )))
}

/// POST /api/products (role=agricultor)
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDto>>), ApiError> {
    if !policy::can(auth.actor(), Action::CreateProduct, &Resource::None) {
        return Err(ApiError::forbidden_role(auth.role.as_str()));
    }

    let name = validate_name(&payload.nombre)?.to_string();
    let description = validate_description(&payload.descripcion)?.to_string();
    let price = validate_price(payload.precio)?;
    let quantity = validate_stock(payload.cantidad)?;

    let product = state
        .store()
        .create_product(
            auth.id,
            NewProduct {
                name,
                description,
                price,
                quantity,
                unit: parse_unit(payload.unidad.as_deref())?.unwrap_or_default(),
                category: parse_category(payload.categoria.as_deref())?.unwrap_or_default(),
                image_url: payload.imagen,
                location: payload.ubicacion,
                harvest_date: payload.fecha_cosecha,
            },
        )
        .await?;

    let body = ApiResponse::with_message("Producto creado exitosamente", ProductDto::from(product));

    Ok((StatusCode::CREATED, Json(body)))
}

/// PUT /api/products/{id} (owner only)
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id(id, "product")?;
    let id = owned_product(&state, auth, id).await?;

    let patch = ProductPatch {
        name: payload
            .nombre
            .as_deref()
            .map(validate_name)
            .transpose()?
            .map(str::to_string),
        description: payload
            .descripcion
            .as_deref()
            .map(validate_description)
            .transpose()?
            .map(str::to_string),
        price: payload.precio.map(validate_price).transpose()?,
        quantity: payload.cantidad.map(validate_stock).transpose()?,
        unit: parse_unit(payload.unidad.as_deref())?,
        category: parse_category(payload.categoria.as_deref())?,
        image_url: payload.imagen,
        available: payload.disponible,
        location: payload.ubicacion,
        harvest_date: payload.fecha_cosecha,
    };

    let product = state
        .store()
        .update_product(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Producto no encontrado"))?;

    Ok(Json(ApiResponse::with_message(
        "Producto actualizado exitosamente",
        ProductDto::from(product),
    )))
}

/// DELETE /api/products/{id} (owner only)
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id(id, "product")?;
    let id = owned_product(&state, auth, id).await?;

    state.store().delete_product(id).await?;

    Ok(Json(ApiResponse::with_message(
        "Producto eliminado exitosamente",
        (),
    )))
}

/// PATCH /api/products/{id}/toggle-disponibilidad (owner only)
pub async fn toggle_availability(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id(id, "product")?;
    let id = owned_product(&state, auth, id).await?;

    let product = state
        .store()
        .toggle_product_availability(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Producto no encontrado"))?;

    let message = if product.available {
        "Producto activado"
    } else {
        "Producto desactivado"
    };

    Ok(Json(ApiResponse::with_message(
        message,
        ProductDto::from(product),
    )))
}
