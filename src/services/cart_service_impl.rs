//! `SeaORM` implementation of the `CartService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::cart::{Cart, recompute_total};
use crate::services::cart_service::{CartError, CartService};

pub struct SeaOrmCartService {
    store: Store,
}

impl SeaOrmCartService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Reloads the cart, recomputes the derived total from its lines and
    /// persists it. Every mutation funnels through here before returning.
    async fn persist_total(&self, user_id: i32) -> Result<Cart, CartError> {
        let mut cart = self
            .store
            .find_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let total = recompute_total(&cart.items);
        self.store.cart_save_total(cart.id, total).await?;
        cart.total = total;

        Ok(cart)
    }
}

#[async_trait]
impl CartService for SeaOrmCartService {
    async fn get_cart(&self, user_id: i32) -> Result<Cart, CartError> {
        Ok(self.store.get_or_create_cart(user_id).await?)
    }

    async fn add_item(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if !product.available {
            return Err(CartError::ProductUnavailable);
        }
        if quantity > product.quantity {
            return Err(CartError::InsufficientStock {
                available: product.quantity,
            });
        }

        let cart = self.store.get_or_create_cart(user_id).await?;

        match cart.items.iter().find(|line| line.product_id == product_id) {
            Some(line) => {
                // Merge and re-validate before touching anything, so an
                // overflow leaves the cart untouched
                let merged = line.quantity + quantity;
                if merged > product.quantity {
                    return Err(CartError::InsufficientStock {
                        available: product.quantity,
                    });
                }
                self.store.cart_set_line_quantity(line.id, merged).await?;
            }
            None => {
                self.store
                    .cart_insert_line(cart.id, product_id, quantity, product.price)
                    .await?;
            }
        }

        self.persist_total(user_id).await
    }

    async fn update_item(
        &self,
        user_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let cart = self
            .store
            .find_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let line = cart
            .items
            .iter()
            .find(|line| line.id == item_id)
            .ok_or(CartError::ItemNotFound)?;

        // Check against the live product row, not the cached cart line
        let product = self
            .store
            .get_product(line.product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if quantity > product.quantity {
            return Err(CartError::InsufficientStock {
                available: product.quantity,
            });
        }

        self.store.cart_set_line_quantity(item_id, quantity).await?;

        self.persist_total(user_id).await
    }

    async fn remove_item(&self, user_id: i32, item_id: i32) -> Result<Cart, CartError> {
        let cart = self
            .store
            .find_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        self.store.cart_delete_line(cart.id, item_id).await?;

        self.persist_total(user_id).await
    }

    async fn clear(&self, user_id: i32) -> Result<Cart, CartError> {
        let cart = self
            .store
            .find_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        self.store.cart_clear_lines(cart.id).await?;
        self.store.cart_save_total(cart.id, 0.0).await?;

        self.store
            .find_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)
    }
}
