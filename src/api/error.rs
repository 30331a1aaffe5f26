use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, CartError, OrderError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    Unauthorized(String),

    Forbidden(String),

    /// Operation illegal for the resource's current state (empty-cart
    /// checkout, cancelling a shipped order, ...)
    InvalidState(String),

    InsufficientStock(String),

    Unavailable(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            ApiError::InsufficientStock(msg) => write!(f, "Insufficient stock: {}", msg),
            ApiError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ValidationError(msg)
            | ApiError::InvalidState(msg)
            | ApiError::InsufficientStock(msg)
            | ApiError::Unavailable(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                let body = ApiResponse::<()>::failure_with_error(
                    "Error interno del servidor",
                    "database error",
                );
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                let body = ApiResponse::<()>::failure_with_error(
                    "Error interno del servidor",
                    "internal error",
                );
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let body = ApiResponse::<()>::failure(message);
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn forbidden_role(role: &str) -> Self {
        ApiError::Forbidden(format!(
            "El rol {role} no tiene permiso para acceder a esta ruta"
        ))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(message),
            AuthError::EmailTaken | AuthError::InvalidResetCode | AuthError::Validation(_) => {
                ApiError::ValidationError(message)
            }
            AuthError::UserNotFound => ApiError::NotFound(message),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let message = err.to_string();
        match err {
            CartError::ProductNotFound | CartError::CartNotFound | CartError::ItemNotFound => {
                ApiError::NotFound(message)
            }
            CartError::ProductUnavailable => ApiError::Unavailable(message),
            CartError::InsufficientStock { .. } => ApiError::InsufficientStock(message),
            CartError::InvalidQuantity => ApiError::ValidationError(message),
            CartError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::EmptyCart
            | OrderError::CancelNotPending(_)
            | OrderError::IllegalTransition { .. } => ApiError::InvalidState(message),
            OrderError::ProductNotFound { .. } | OrderError::OrderNotFound => {
                ApiError::NotFound(message)
            }
            OrderError::ProductUnavailable { .. } => ApiError::Unavailable(message),
            OrderError::InsufficientStock { .. } => ApiError::InsufficientStock(message),
            OrderError::Forbidden => ApiError::Forbidden(message),
            OrderError::UnknownStatus(_) | OrderError::NotesTooLong => {
                ApiError::ValidationError(message)
            }
            OrderError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}
