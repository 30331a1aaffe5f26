use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub buyer_id: i32,

    /// Equals the sum of item subtotals at creation; never touched afterwards
    pub total: f64,

    /// One of the six recognized states; the only mutable column
    pub status: String,

    pub delivery_street: Option<String>,

    pub delivery_city: Option<String>,

    pub delivery_state: Option<String>,

    pub delivery_postal_code: Option<String>,

    pub delivery_phone: Option<String>,

    /// "efectivo", "tarjeta" or "transferencia"
    pub payment_method: String,

    pub notes: Option<String>,

    pub created_at: String,

    pub estimated_delivery: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BuyerId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
