use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub description: String,

    pub price: f64,

    /// On-hand stock; decremented at checkout, restored on cancellation
    pub quantity: i32,

    /// "kg", "piezas", "litros", "cajas" or "toneladas"
    pub unit: String,

    /// "frutas", "verduras", "granos", "lacteos", "carnes" or "otros"
    pub category: String,

    pub image_url: Option<String>,

    pub available: bool,

    /// Owning producer; only the owner may mutate or delete
    pub farmer_id: i32,

    pub location: Option<String>,

    pub harvest_date: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FarmerId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
