use serde::{Deserialize, Serialize};

use crate::models::user::PartyRef;

/// Order lifecycle states. `Pending` is initial; `Delivered` and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "confirmado")]
    Confirmed,
    #[serde(rename = "en_proceso")]
    InProgress,
    #[serde(rename = "enviado")]
    Shipped,
    #[serde(rename = "entregado")]
    Delivered,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Confirmed => "confirmado",
            Self::InProgress => "en_proceso",
            Self::Shipped => "enviado",
            Self::Delivered => "entregado",
            Self::Cancelled => "cancelado",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(Self::Pending),
            "confirmado" => Some(Self::Confirmed),
            "en_proceso" => Some(Self::InProgress),
            "enviado" => Some(Self::Shipped),
            "entregado" => Some(Self::Delivered),
            "cancelado" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Forward-only transition table. Orders move towards delivery and may
    /// drop to cancelled while still pending or confirmed; nothing leaves a
    /// terminal state.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "efectivo")]
    Cash,
    #[serde(rename = "tarjeta")]
    Card,
    #[serde(rename = "transferencia")]
    Transfer,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "efectivo",
            Self::Card => "tarjeta",
            Self::Transfer => "transferencia",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "efectivo" => Some(Self::Cash),
            "tarjeta" => Some(Self::Card),
            "transferencia" => Some(Self::Transfer),
            _ => None,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Cash
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
}

/// One snapshotted line of an order. Everything here is frozen at checkout.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub subtotal: f64,
    pub farmer_id: i32,
    pub farmer: Option<PartyRef>,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i32,
    pub buyer_id: i32,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub delivery: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: String,
    pub estimated_delivery: String,
    pub buyer: Option<PartyRef>,
}

/// Aggregates for a producer across all orders containing their items.
#[derive(Debug, Clone, Default)]
pub struct FarmerStats {
    /// Sum of the producer's own item subtotals
    pub total_sales: f64,
    /// Distinct products of theirs appearing in those orders
    pub product_count: u64,
    /// Orders still pending that contain at least one of their items
    pub pending_orders: u64,
    /// All orders containing at least one of their items
    pub total_orders: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_may_confirm_or_cancel() {
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Confirmed));
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition(OrderStatus::Shipped));
        assert!(!OrderStatus::Pending.can_transition(OrderStatus::Delivered));
    }

    #[test]
    fn forward_path_reaches_delivered() {
        assert!(OrderStatus::Confirmed.can_transition(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition(OrderStatus::Delivered));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InProgress,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Delivered.can_transition(next));
            assert!(!OrderStatus::Cancelled.can_transition(next));
        }
    }

    #[test]
    fn no_backward_transitions() {
        assert!(!OrderStatus::Shipped.can_transition(OrderStatus::Pending));
        assert!(!OrderStatus::InProgress.can_transition(OrderStatus::Confirmed));
        assert!(!OrderStatus::Shipped.can_transition(OrderStatus::Cancelled));
    }

    #[test]
    fn status_wire_names_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InProgress,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("devuelto"), None);
    }
}
