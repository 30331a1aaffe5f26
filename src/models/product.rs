use serde::{Deserialize, Serialize};

use crate::models::user::PartyRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "piezas")]
    Piece,
    #[serde(rename = "litros")]
    Litre,
    #[serde(rename = "cajas")]
    Box,
    #[serde(rename = "toneladas")]
    Tonne,
}

impl Unit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kilogram => "kg",
            Self::Piece => "piezas",
            Self::Litre => "litros",
            Self::Box => "cajas",
            Self::Tonne => "toneladas",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(Self::Kilogram),
            "piezas" => Some(Self::Piece),
            "litros" => Some(Self::Litre),
            "cajas" => Some(Self::Box),
            "toneladas" => Some(Self::Tonne),
            _ => None,
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::Kilogram
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "frutas")]
    Fruits,
    #[serde(rename = "verduras")]
    Vegetables,
    #[serde(rename = "granos")]
    Grains,
    #[serde(rename = "lacteos")]
    Dairy,
    #[serde(rename = "carnes")]
    Meat,
    #[serde(rename = "otros")]
    Other,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fruits => "frutas",
            Self::Vegetables => "verduras",
            Self::Grains => "granos",
            Self::Dairy => "lacteos",
            Self::Meat => "carnes",
            Self::Other => "otros",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "frutas" => Some(Self::Fruits),
            "verduras" => Some(Self::Vegetables),
            "granos" => Some(Self::Grains),
            "lacteos" => Some(Self::Dairy),
            "carnes" => Some(Self::Meat),
            "otros" => Some(Self::Other),
            _ => None,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub unit: Unit,
    pub category: Category,
    pub image_url: Option<String>,
    pub available: bool,
    pub farmer_id: i32,
    pub location: Option<String>,
    pub harvest_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Owner summary, resolved on reads that populate it
    pub farmer: Option<PartyRef>,
}

/// Input for product creation; the owner comes from the authenticated user.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub unit: Unit,
    pub category: Category,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub harvest_date: Option<String>,
}

/// Partial product update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub unit: Option<Unit>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    pub location: Option<String>,
    pub harvest_date: Option<String>,
}

/// Catalog listing filters. `available` defaults to true so buyers only see
/// purchasable stock unless they ask otherwise.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub available: bool,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            available: true,
        }
    }
}
