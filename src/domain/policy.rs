//! Access policy evaluated once per request.
//!
//! Handlers gather the ownership facts for the resource they touch and ask
//! `can` for a verdict instead of sprinkling role/ownership checks inline.

use crate::models::user::Role;

/// The acting principal, resolved by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read or mutate the own cart
    ManageCart,
    /// Create an order from the own cart
    PlaceOrder,
    /// Cancel an order as its buyer
    CancelOrder,
    /// List the own orders as a buyer
    ViewOwnOrders,
    /// Read a single order
    ViewOrder,
    /// Move an order through the status machine
    UpdateOrderStatus,
    /// List received orders / stats as a producer
    ViewReceivedOrders,
    /// Create a product
    CreateProduct,
    /// Mutate or delete an existing product
    MutateProduct,
}

/// Ownership facts about the resource under decision.
#[derive(Debug, Clone)]
pub enum Resource<'a> {
    None,
    Product { owner_id: i32 },
    Order { buyer_id: i32, farmer_ids: &'a [i32] },
}

/// Single policy entry point: may `actor` perform `action` on `resource`?
///
/// Producers get order visibility only through items they own — a deliberate
/// tightening over letting any producer read any order.
#[must_use]
pub fn can(actor: Actor, action: Action, resource: &Resource<'_>) -> bool {
    match (action, resource) {
        (Action::ManageCart | Action::PlaceOrder | Action::ViewOwnOrders, _) => {
            actor.role == Role::Buyer
        }
        (Action::CreateProduct | Action::ViewReceivedOrders, _) => actor.role == Role::Farmer,
        (Action::MutateProduct, Resource::Product { owner_id }) => {
            actor.role == Role::Farmer && *owner_id == actor.id
        }
        (Action::CancelOrder, Resource::Order { buyer_id, .. }) => {
            actor.role == Role::Buyer && *buyer_id == actor.id
        }
        (Action::ViewOrder, Resource::Order { buyer_id, farmer_ids }) => {
            *buyer_id == actor.id
                || (actor.role == Role::Farmer && farmer_ids.contains(&actor.id))
        }
        (Action::UpdateOrderStatus, Resource::Order { farmer_ids, .. }) => {
            actor.role == Role::Farmer && farmer_ids.contains(&actor.id)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUYER: Actor = Actor {
        id: 1,
        role: Role::Buyer,
    };
    const FARMER: Actor = Actor {
        id: 2,
        role: Role::Farmer,
    };
    const OTHER_FARMER: Actor = Actor {
        id: 3,
        role: Role::Farmer,
    };

    #[test]
    fn only_buyers_manage_carts() {
        assert!(can(BUYER, Action::ManageCart, &Resource::None));
        assert!(!can(FARMER, Action::ManageCart, &Resource::None));
    }

    #[test]
    fn product_mutation_requires_ownership() {
        let owned = Resource::Product { owner_id: 2 };
        assert!(can(FARMER, Action::MutateProduct, &owned));
        assert!(!can(OTHER_FARMER, Action::MutateProduct, &owned));
        assert!(!can(BUYER, Action::MutateProduct, &owned));
    }

    #[test]
    fn order_visibility_is_buyer_or_involved_farmer() {
        let order = Resource::Order {
            buyer_id: 1,
            farmer_ids: &[2],
        };
        assert!(can(BUYER, Action::ViewOrder, &order));
        assert!(can(FARMER, Action::ViewOrder, &order));
        assert!(!can(OTHER_FARMER, Action::ViewOrder, &order));
    }

    #[test]
    fn status_updates_need_an_owned_item() {
        let order = Resource::Order {
            buyer_id: 1,
            farmer_ids: &[2],
        };
        assert!(can(FARMER, Action::UpdateOrderStatus, &order));
        assert!(!can(OTHER_FARMER, Action::UpdateOrderStatus, &order));
        assert!(!can(BUYER, Action::UpdateOrderStatus, &order));
    }

    #[test]
    fn cancel_is_reserved_to_the_orders_buyer() {
        let order = Resource::Order {
            buyer_id: 1,
            farmer_ids: &[2],
        };
        assert!(can(BUYER, Action::CancelOrder, &order));
        assert!(!can(Actor { id: 9, role: Role::Buyer }, Action::CancelOrder, &order));
        assert!(!can(FARMER, Action::CancelOrder, &order));
    }
}
