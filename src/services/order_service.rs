//! Domain service for checkout, order lifecycle and producer views.

use thiserror::Error;

use crate::domain::policy::Actor;
use crate::models::order::{
    DeliveryAddress, FarmerStats, Order, OrderStatus, PaymentMethod,
};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("El carrito está vacío")]
    EmptyCart,

    #[error("Producto {name} no encontrado")]
    ProductNotFound { name: String },

    #[error("El producto {name} ya no está disponible")]
    ProductUnavailable { name: String },

    #[error("Stock insuficiente para {name}. Solo hay {available} unidades")]
    InsufficientStock { name: String, available: i32 },

    #[error("Pedido no encontrado")]
    OrderNotFound,

    #[error("No tienes permiso para acceder a este pedido")]
    Forbidden,

    #[error("No se puede cancelar un pedido en estado: {0}")]
    CancelNotPending(String),

    #[error("No se puede cambiar el estado de {from} a {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Estado no válido: {0}")]
    UnknownStatus(String),

    #[error("Las notas no pueden exceder 500 caracteres")]
    NotesTooLong,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Checkout input as accepted from the wire.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub delivery: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Order workflow. Stock validation is all-or-nothing: the checkout either
/// snapshots the whole cart and decrements every product, or touches
/// nothing. Ownership decisions go through the policy module.
#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Converts the buyer's cart into a pending order, decrements stock and
    /// empties the cart, all in one transaction.
    async fn checkout(&self, actor: Actor, input: CheckoutInput) -> Result<Order, OrderError>;

    /// Returns an order visible to the actor: its buyer, or a farmer owning
    /// at least one of its items.
    async fn get(&self, actor: Actor, order_id: i32) -> Result<Order, OrderError>;

    /// The buyer's own orders, newest first.
    async fn list_for_buyer(&self, actor: Actor) -> Result<Vec<Order>, OrderError>;

    /// Orders containing at least one item of the acting farmer, newest
    /// first.
    async fn list_for_farmer(&self, actor: Actor) -> Result<Vec<Order>, OrderError>;

    /// Buyer-initiated cancel; only legal while the order is pending.
    /// Restores every item's quantity to its product.
    async fn cancel(&self, actor: Actor, order_id: i32) -> Result<Order, OrderError>;

    /// Producer-initiated transition through the status machine. Moving into
    /// `cancelado` restores stock like a buyer cancel.
    async fn update_status(
        &self,
        actor: Actor,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<Order, OrderError>;

    /// Sales aggregates for the acting farmer.
    async fn farmer_stats(&self, actor: Actor) -> Result<FarmerStats, OrderError>;
}
