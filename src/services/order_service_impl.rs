//! `SeaORM` implementation of the `OrderService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{NewOrder, NewOrderItem, StockGuardError, Store};
use crate::domain::policy::{self, Action, Actor, Resource};
use crate::models::order::{FarmerStats, Order, OrderStatus};
use crate::services::order_service::{CheckoutInput, OrderError, OrderService};

const MAX_NOTES_LEN: usize = 500;

pub struct SeaOrmOrderService {
    store: Store,
}

impl SeaOrmOrderService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn load_order(&self, order_id: i32) -> Result<Order, OrderError> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }
}

fn farmer_ids(order: &Order) -> Vec<i32> {
    order.items.iter().map(|item| item.farmer_id).collect()
}

#[async_trait]
impl OrderService for SeaOrmOrderService {
    async fn checkout(&self, actor: Actor, input: CheckoutInput) -> Result<Order, OrderError> {
        if let Some(notes) = &input.notes
            && notes.chars().count() > MAX_NOTES_LEN
        {
            return Err(OrderError::NotesTooLong);
        }

        let cart = self
            .store
            .find_cart(actor.id)
            .await?
            .filter(|cart| !cart.items.is_empty())
            .ok_or(OrderError::EmptyCart)?;

        // Validation pass against the live catalog. Nothing is written until
        // every line has passed.
        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let cached_name = line
                .product
                .as_ref()
                .map_or_else(|| line.product_id.to_string(), |p| p.name.clone());

            let product = self
                .store
                .get_product(line.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound { name: cached_name })?;

            if !product.available {
                return Err(OrderError::ProductUnavailable { name: product.name });
            }
            if product.quantity < line.quantity {
                return Err(OrderError::InsufficientStock {
                    name: product.name,
                    available: product.quantity,
                });
            }

            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                // the captured cart price, not the product's current one
                unit_price: line.price,
                subtotal: line.price * f64::from(line.quantity),
                farmer_id: product.farmer_id,
            });
        }

        let order_id = self
            .store
            .checkout_order(NewOrder {
                buyer_id: actor.id,
                cart_id: cart.id,
                items,
                total: cart.total,
                delivery: input.delivery,
                payment_method: input.payment_method,
                notes: input.notes,
            })
            .await
            .map_err(|err| match err {
                StockGuardError::Insufficient { product_id } => {
                    // Lost a race with a concurrent checkout; report it the
                    // same way the validation pass would have
                    let line = cart.items.iter().find(|l| l.product_id == product_id);
                    OrderError::InsufficientStock {
                        name: line
                            .and_then(|l| l.product.as_ref().map(|p| p.name.clone()))
                            .unwrap_or_else(|| product_id.to_string()),
                        available: 0,
                    }
                }
                StockGuardError::Db(err) => err.into(),
            })?;

        info!(order_id, buyer_id = actor.id, "Order created");

        self.load_order(order_id).await
    }

    async fn get(&self, actor: Actor, order_id: i32) -> Result<Order, OrderError> {
        let order = self.load_order(order_id).await?;

        let farmers = farmer_ids(&order);
        let resource = Resource::Order {
            buyer_id: order.buyer_id,
            farmer_ids: &farmers,
        };
        if !policy::can(actor, Action::ViewOrder, &resource) {
            return Err(OrderError::Forbidden);
        }

        Ok(order)
    }

    async fn list_for_buyer(&self, actor: Actor) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.orders_by_buyer(actor.id).await?)
    }

    async fn list_for_farmer(&self, actor: Actor) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.orders_by_farmer(actor.id).await?)
    }

    async fn cancel(&self, actor: Actor, order_id: i32) -> Result<Order, OrderError> {
        let order = self.load_order(order_id).await?;

        let farmers = farmer_ids(&order);
        let resource = Resource::Order {
            buyer_id: order.buyer_id,
            farmer_ids: &farmers,
        };
        if !policy::can(actor, Action::CancelOrder, &resource) {
            return Err(OrderError::Forbidden);
        }

        if order.status != OrderStatus::Pending {
            return Err(OrderError::CancelNotPending(
                order.status.as_str().to_string(),
            ));
        }

        self.store.cancel_order_and_restock(order_id).await?;

        info!(order_id, buyer_id = actor.id, "Order cancelled");

        self.load_order(order_id).await
    }

    async fn update_status(
        &self,
        actor: Actor,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self.load_order(order_id).await?;

        let farmers = farmer_ids(&order);
        let resource = Resource::Order {
            buyer_id: order.buyer_id,
            farmer_ids: &farmers,
        };
        if !policy::can(actor, Action::UpdateOrderStatus, &resource) {
            return Err(OrderError::Forbidden);
        }

        if !order.status.can_transition(status) {
            return Err(OrderError::IllegalTransition {
                from: order.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }

        if status == OrderStatus::Cancelled {
            // Same restock path as a buyer cancel, so stock stays consistent
            // with outstanding orders
            self.store.cancel_order_and_restock(order_id).await?;
        } else {
            self.store.set_order_status(order_id, status).await?;
        }

        info!(
            order_id,
            farmer_id = actor.id,
            status = status.as_str(),
            "Order status updated"
        );

        self.load_order(order_id).await
    }

    async fn farmer_stats(&self, actor: Actor) -> Result<FarmerStats, OrderError> {
        Ok(self.store.farmer_order_stats(actor.id).await?)
    }
}
