/// Slim product summary attached to cart lines on reads, mirroring what the
/// catalog currently says about the product. Line price stays the captured
/// add-time price regardless.
#[derive(Debug, Clone)]
pub struct ProductRef {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    /// Unit price captured when the line was added
    pub price: f64,
    pub product: Option<ProductRef>,
}

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: i32,
    pub user_id: i32,
    pub items: Vec<CartLine>,
    pub total: f64,
    pub updated_at: String,
}

/// Derived cart total. Every mutating cart operation must persist the value
/// this returns; the total is never read back lazily or set independently.
#[must_use]
pub fn recompute_total(items: &[CartLine]) -> f64 {
    items
        .iter()
        .map(|line| line.price * f64::from(line.quantity))
        .sum()
}
