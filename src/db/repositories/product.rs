use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{products, users};
use crate::models::product::{NewProduct, Product, ProductFilter, ProductPatch, Unit};
use crate::models::product::Category;
use crate::models::user::PartyRef;

pub struct ProductRepository {
    conn: DatabaseConnection,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: products::Model, farmer: Option<users::Model>) -> Product {
        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
            unit: Unit::parse(&model.unit).unwrap_or_default(),
            category: Category::parse(&model.category).unwrap_or_default(),
            image_url: model.image_url,
            available: model.available,
            farmer_id: model.farmer_id,
            location: model.location,
            harvest_date: model.harvest_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
            farmer: farmer.map(|u| PartyRef {
                id: u.id,
                name: u.name,
                email: u.email,
                phone: u.phone,
            }),
        }
    }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let mut query = products::Entity::find()
            .filter(products::Column::Available.eq(filter.available));

        if let Some(category) = filter.category {
            query = query.filter(products::Column::Category.eq(category.as_str()));
        }

        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(products::Column::Name.contains(search))
                    .add(products::Column::Description.contains(search)),
            );
        }

        let rows = query
            .order_by_desc(products::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list products")?;

        Ok(rows
            .into_iter()
            .map(|(product, farmer)| Self::map_model(product, farmer))
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Product>> {
        let row = products::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query product")?;

        Ok(row.map(|(product, farmer)| Self::map_model(product, farmer)))
    }

    pub async fn list_by_farmer(&self, farmer_id: i32) -> Result<Vec<Product>> {
        let rows = products::Entity::find()
            .filter(products::Column::FarmerId.eq(farmer_id))
            .order_by_desc(products::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list farmer products")?;

        Ok(rows
            .into_iter()
            .map(|product| Self::map_model(product, None))
            .collect())
    }

    pub async fn create(&self, farmer_id: i32, input: NewProduct) -> Result<Product> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = products::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            quantity: Set(input.quantity),
            unit: Set(input.unit.as_str().to_string()),
            category: Set(input.category.as_str().to_string()),
            image_url: Set(input.image_url),
            available: Set(true),
            farmer_id: Set(farmer_id),
            location: Set(input.location),
            harvest_date: Set(input.harvest_date),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert product")?;

        Ok(Self::map_model(model, None))
    }

    pub async fn update(&self, id: i32, patch: ProductPatch) -> Result<Option<Product>> {
        let Some(product) = products::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query product for update")?
        else {
            return Ok(None);
        };

        let mut active: products::ActiveModel = product.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(quantity) = patch.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(unit) = patch.unit {
            active.unit = Set(unit.as_str().to_string());
        }
        if let Some(category) = patch.category {
            active.category = Set(category.as_str().to_string());
        }
        if let Some(image_url) = patch.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(available) = patch.available {
            active.available = Set(available);
        }
        if let Some(location) = patch.location {
            active.location = Set(Some(location));
        }
        if let Some(harvest_date) = patch.harvest_date {
            active.harvest_date = Set(Some(harvest_date));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(Self::map_model(model, None)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = products::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete product")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn toggle_availability(&self, id: i32) -> Result<Option<Product>> {
        let Some(product) = products::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query product for availability toggle")?
        else {
            return Ok(None);
        };

        let flipped = !product.available;
        let mut active: products::ActiveModel = product.into();
        active.available = Set(flipped);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(Self::map_model(model, None)))
    }
}
