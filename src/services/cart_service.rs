//! Domain service for the per-buyer cart aggregate.

use thiserror::Error;

use crate::models::cart::Cart;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Producto no encontrado")]
    ProductNotFound,

    #[error("Este producto no está disponible")]
    ProductUnavailable,

    #[error("Solo hay {available} unidades disponibles")]
    InsufficientStock { available: i32 },

    #[error("Carrito no encontrado")]
    CartNotFound,

    #[error("Item no encontrado en el carrito")]
    ItemNotFound,

    #[error("La cantidad debe ser al menos 1")]
    InvalidQuantity,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for CartError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CartError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Cart operations. Every mutation re-validates against live product stock
/// and finishes by recomputing the derived total; a failed validation leaves
/// the cart exactly as it was.
#[async_trait::async_trait]
pub trait CartService: Send + Sync {
    /// Returns the user's cart, creating an empty one on first access.
    async fn get_cart(&self, user_id: i32) -> Result<Cart, CartError>;

    /// Adds a product, merging quantities when a line already exists.
    async fn add_item(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<Cart, CartError>;

    /// Replaces a line's quantity after re-checking stock.
    async fn update_item(
        &self,
        user_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> Result<Cart, CartError>;

    /// Removes a line; removing an absent line is a no-op.
    async fn remove_item(&self, user_id: i32, item_id: i32) -> Result<Cart, CartError>;

    /// Empties the cart and zeroes the total.
    async fn clear(&self, user_id: i32) -> Result<Cart, CartError>;
}
