use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{cart_items, carts, products};
use crate::models::cart::{Cart, CartLine, ProductRef};

/// Storage primitives for the one-cart-per-user aggregate. Stock checks and
/// total recomputation live in the cart service; this layer only moves rows.
pub struct CartRepository {
    conn: DatabaseConnection,
}

impl CartRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn load_lines(&self, cart_id: i32) -> Result<Vec<CartLine>> {
        let rows = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::Id)
            .find_also_related(products::Entity)
            .all(&self.conn)
            .await
            .context("Failed to load cart items")?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| CartLine {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                product: product.map(|p| ProductRef {
                    id: p.id,
                    name: p.name,
                    price: p.price,
                    image_url: p.image_url,
                    available: p.available,
                }),
            })
            .collect())
    }

    async fn assemble(&self, model: carts::Model) -> Result<Cart> {
        let items = self.load_lines(model.id).await?;
        Ok(Cart {
            id: model.id,
            user_id: model.user_id,
            items,
            total: model.total,
            updated_at: model.updated_at,
        })
    }

    pub async fn find(&self, user_id: i32) -> Result<Option<Cart>> {
        let cart = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query cart")?;

        match cart {
            Some(model) => Ok(Some(self.assemble(model).await?)),
            None => Ok(None),
        }
    }

    /// Returns the user's cart, creating an empty one on first access.
    pub async fn get_or_create(&self, user_id: i32) -> Result<Cart> {
        if let Some(cart) = self.find(user_id).await? {
            return Ok(cart);
        }

        let active = carts::ActiveModel {
            user_id: Set(user_id),
            total: Set(0.0),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create cart")?;

        self.assemble(model).await
    }

    pub async fn insert_line(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
        price: f64,
    ) -> Result<()> {
        let active = cart_items::ActiveModel {
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert cart item")?;

        Ok(())
    }

    pub async fn set_line_quantity(&self, line_id: i32, quantity: i32) -> Result<()> {
        let item = cart_items::Entity::find_by_id(line_id)
            .one(&self.conn)
            .await
            .context("Failed to query cart item")?
            .ok_or_else(|| anyhow::anyhow!("Cart item not found: {line_id}"))?;

        let mut active: cart_items::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Filter-based removal; removing an absent line is a no-op.
    pub async fn delete_line(&self, cart_id: i32, line_id: i32) -> Result<()> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::Id.eq(line_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete cart item")?;

        Ok(())
    }

    pub async fn clear_lines(&self, cart_id: i32) -> Result<()> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .exec(&self.conn)
            .await
            .context("Failed to clear cart")?;

        Ok(())
    }

    /// Persist the derived total. Every mutating cart operation ends here.
    pub async fn save_total(&self, cart_id: i32, total: f64) -> Result<()> {
        let cart = carts::Entity::find_by_id(cart_id)
            .one(&self.conn)
            .await
            .context("Failed to query cart for total update")?
            .ok_or_else(|| anyhow::anyhow!("Cart not found: {cart_id}"))?;

        let mut active: carts::ActiveModel = cart.into();
        active.total = Set(total);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }
}
