use serde::{Deserialize, Serialize};

/// Account role. Farmers own products and receive orders; buyers own a cart
/// and place orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "agricultor")]
    Farmer,
    #[serde(rename = "comprador")]
    Buyer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "agricultor",
            Self::Buyer => "comprador",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agricultor" => Some(Self::Farmer),
            "comprador" => Some(Self::Buyer),
            _ => None,
        }
    }
}

/// User data as handed out by the store. The password hash never leaves the
/// repository layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Slim user summary embedded in populated carts and orders.
#[derive(Debug, Clone)]
pub struct PartyRef {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        assert_eq!(Role::parse("agricultor"), Some(Role::Farmer));
        assert_eq!(Role::parse("comprador"), Some(Role::Buyer));
        assert_eq!(Role::Farmer.as_str(), "agricultor");
        assert_eq!(Role::Buyer.as_str(), "comprador");
        assert_eq!(Role::parse("admin"), None);
    }
}
