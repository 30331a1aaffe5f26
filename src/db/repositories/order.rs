use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;

use crate::entities::{cart_items, carts, order_items, orders, products, users};
use crate::models::order::{
    DeliveryAddress, FarmerStats, Order, OrderItem, OrderStatus, PaymentMethod,
};
use crate::models::user::PartyRef;

/// Failure of the guarded stock decrement inside the checkout transaction.
/// The guard only fires when a concurrent order depleted the product between
/// the validation pass and the write; the whole transaction rolls back.
#[derive(Debug, Error)]
pub enum StockGuardError {
    #[error("Insufficient stock for product {product_id}")]
    Insufficient { product_id: i32 },

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

/// Snapshot of one cart line, assembled by the order service during the
/// validation pass.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub subtotal: f64,
    pub farmer_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: i32,
    pub cart_id: i32,
    pub items: Vec<NewOrderItem>,
    pub total: f64,
    pub delivery: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Persist a checkout atomically: order + item snapshots, one guarded
    /// stock decrement per product, and the cart wipe all commit together or
    /// not at all.
    pub async fn checkout(&self, input: NewOrder) -> Result<i32, StockGuardError> {
        let now = chrono::Utc::now();
        let estimated = now + chrono::Duration::days(3);

        let txn = self.conn.begin().await?;

        let inserted = orders::Entity::insert(orders::ActiveModel {
            buyer_id: Set(input.buyer_id),
            total: Set(input.total),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            delivery_street: Set(input.delivery.street),
            delivery_city: Set(input.delivery.city),
            delivery_state: Set(input.delivery.state),
            delivery_postal_code: Set(input.delivery.postal_code),
            delivery_phone: Set(input.delivery.phone),
            payment_method: Set(input.payment_method.as_str().to_string()),
            notes: Set(input.notes),
            created_at: Set(now.to_rfc3339()),
            estimated_delivery: Set(estimated.to_rfc3339()),
            ..Default::default()
        })
        .exec(&txn)
        .await?;

        let order_id = inserted.last_insert_id;

        for item in &input.items {
            order_items::Entity::insert(order_items::ActiveModel {
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                subtotal: Set(item.subtotal),
                farmer_id: Set(item.farmer_id),
                ..Default::default()
            })
            .exec(&txn)
            .await?;

            // quantity >= n guard; zero rows affected means a concurrent
            // order got there first
            let decrement = products::Entity::update_many()
                .col_expr(
                    products::Column::Quantity,
                    Expr::col(products::Column::Quantity).sub(item.quantity),
                )
                .filter(products::Column::Id.eq(item.product_id))
                .filter(products::Column::Quantity.gte(item.quantity))
                .exec(&txn)
                .await?;

            if decrement.rows_affected == 0 {
                return Err(StockGuardError::Insufficient {
                    product_id: item.product_id,
                });
            }
        }

        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(input.cart_id))
            .exec(&txn)
            .await?;

        carts::Entity::update_many()
            .col_expr(carts::Column::Total, Expr::value(0.0))
            .col_expr(carts::Column::UpdatedAt, Expr::value(now.to_rfc3339()))
            .filter(carts::Column::Id.eq(input.cart_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(order_id)
    }

    /// Move an order to `cancelado` and hand every item's quantity back to
    /// its product — the exact inverse of checkout's decrement, in one
    /// transaction.
    pub async fn cancel_and_restock(&self, order_id: i32) -> Result<()> {
        let txn = self.conn.begin().await?;

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .all(&txn)
            .await
            .context("Failed to load order items for restock")?;

        orders::Entity::update_many()
            .col_expr(
                orders::Column::Status,
                Expr::value(OrderStatus::Cancelled.as_str()),
            )
            .filter(orders::Column::Id.eq(order_id))
            .exec(&txn)
            .await?;

        for item in items {
            products::Entity::update_many()
                .col_expr(
                    products::Column::Quantity,
                    Expr::col(products::Column::Quantity).add(item.quantity),
                )
                .filter(products::Column::Id.eq(item.product_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        Ok(())
    }

    pub async fn set_status(&self, order_id: i32, status: OrderStatus) -> Result<()> {
        orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(status.as_str()))
            .filter(orders::Column::Id.eq(order_id))
            .exec(&self.conn)
            .await
            .context("Failed to update order status")?;

        Ok(())
    }

    pub async fn get(&self, order_id: i32) -> Result<Option<Order>> {
        let Some(model) = orders::Entity::find_by_id(order_id)
            .one(&self.conn)
            .await
            .context("Failed to query order")?
        else {
            return Ok(None);
        };

        let mut assembled = self.assemble(vec![model]).await?;
        Ok(assembled.pop())
    }

    pub async fn list_by_buyer(&self, buyer_id: i32) -> Result<Vec<Order>> {
        let models = orders::Entity::find()
            .filter(orders::Column::BuyerId.eq(buyer_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list buyer orders")?;

        self.assemble(models).await
    }

    /// Orders containing at least one line item owned by the farmer.
    pub async fn list_by_farmer(&self, farmer_id: i32) -> Result<Vec<Order>> {
        let item_rows = order_items::Entity::find()
            .filter(order_items::Column::FarmerId.eq(farmer_id))
            .all(&self.conn)
            .await
            .context("Failed to query farmer order items")?;

        let order_ids: HashSet<i32> = item_rows.iter().map(|item| item.order_id).collect();
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = orders::Entity::find()
            .filter(orders::Column::Id.is_in(order_ids))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list farmer orders")?;

        self.assemble(models).await
    }

    pub async fn stats_for_farmer(&self, farmer_id: i32) -> Result<FarmerStats> {
        let rows = order_items::Entity::find()
            .filter(order_items::Column::FarmerId.eq(farmer_id))
            .find_also_related(orders::Entity)
            .all(&self.conn)
            .await
            .context("Failed to query farmer stats")?;

        let mut stats = FarmerStats::default();
        let mut products_seen = HashSet::new();
        let mut orders_seen = HashSet::new();
        let mut pending_seen = HashSet::new();

        for (item, order) in rows {
            stats.total_sales += item.subtotal;
            products_seen.insert(item.product_id);
            orders_seen.insert(item.order_id);
            if let Some(order) = order
                && order.status == OrderStatus::Pending.as_str()
            {
                pending_seen.insert(item.order_id);
            }
        }

        stats.product_count = products_seen.len() as u64;
        stats.total_orders = orders_seen.len() as u64;
        stats.pending_orders = pending_seen.len() as u64;

        Ok(stats)
    }

    /// Resolve items plus buyer/farmer summaries for a page of order rows,
    /// preserving the given order.
    async fn assemble(&self, models: Vec<orders::Model>) -> Result<Vec<Order>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = models.iter().map(|o| o.id).collect();

        let item_rows = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load order items")?;

        let mut user_ids: HashSet<i32> = models.iter().map(|o| o.buyer_id).collect();
        user_ids.extend(item_rows.iter().map(|item| item.farmer_id));

        let parties: HashMap<i32, PartyRef> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.conn)
            .await
            .context("Failed to load order parties")?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    PartyRef {
                        id: u.id,
                        name: u.name,
                        email: u.email,
                        phone: u.phone,
                    },
                )
            })
            .collect();

        let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for item in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItem {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal,
                    farmer_id: item.farmer_id,
                    farmer: parties.get(&item.farmer_id).cloned(),
                });
        }

        Ok(models
            .into_iter()
            .map(|model| Order {
                id: model.id,
                buyer: parties.get(&model.buyer_id).cloned(),
                buyer_id: model.buyer_id,
                items: items_by_order.remove(&model.id).unwrap_or_default(),
                total: model.total,
                status: OrderStatus::parse(&model.status).unwrap_or(OrderStatus::Pending),
                delivery: DeliveryAddress {
                    street: model.delivery_street,
                    city: model.delivery_city,
                    state: model.delivery_state,
                    postal_code: model.delivery_postal_code,
                    phone: model.delivery_phone,
                },
                payment_method: PaymentMethod::parse(&model.payment_method).unwrap_or_default(),
                notes: model.notes,
                created_at: model.created_at,
                estimated_delivery: model.estimated_delivery,
            })
            .collect())
    }
}
