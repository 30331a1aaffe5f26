use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::cart::Cart;
use crate::models::order::{FarmerStats, Order, OrderStatus};
use crate::models::product::{NewProduct, Product, ProductFilter, ProductPatch};
use crate::models::user::{ProfilePatch, User};

pub mod migrator;
pub mod repositories;

pub use repositories::order::{NewOrder, NewOrderItem, StockGuardError};
pub use repositories::user::NewUser;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn product_repo(&self) -> repositories::product::ProductRepository {
        repositories::product::ProductRepository::new(self.conn.clone())
    }

    fn cart_repo(&self) -> repositories::cart::CartRepository {
        repositories::cart::CartRepository::new(self.conn.clone())
    }

    fn order_repo(&self) -> repositories::order::OrderRepository {
        repositories::order::OrderRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn create_user(
        &self,
        input: NewUser,
        security: &SecurityConfig,
    ) -> Result<(User, String)> {
        self.user_repo().create(input, security).await
    }

    pub async fn find_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.user_repo().find_by_token(token).await
    }

    pub async fn user_access_token(&self, id: i32) -> Result<Option<String>> {
        self.user_repo().access_token_for(id).await
    }

    pub async fn verify_user_password(&self, id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password(id, password).await
    }

    pub async fn verify_user_password_by_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<bool> {
        self.user_repo()
            .verify_password_by_email(email, password)
            .await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        patch: ProfilePatch,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, patch).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, security)
            .await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn set_reset_token(&self, id: i32, code: &str, expires_at: &str) -> Result<()> {
        self.user_repo().set_reset_token(id, code, expires_at).await
    }

    pub async fn find_user_by_reset_code(&self, code: &str) -> Result<Option<(User, String)>> {
        self.user_repo().find_by_reset_code(code).await
    }

    pub async fn consume_reset_token(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .consume_reset_token(id, new_password, security)
            .await
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        self.product_repo().list(filter).await
    }

    pub async fn get_product(&self, id: i32) -> Result<Option<Product>> {
        self.product_repo().get(id).await
    }

    pub async fn list_farmer_products(&self, farmer_id: i32) -> Result<Vec<Product>> {
        self.product_repo().list_by_farmer(farmer_id).await
    }

    pub async fn create_product(&self, farmer_id: i32, input: NewProduct) -> Result<Product> {
        self.product_repo().create(farmer_id, input).await
    }

    pub async fn update_product(&self, id: i32, patch: ProductPatch) -> Result<Option<Product>> {
        self.product_repo().update(id, patch).await
    }

    pub async fn delete_product(&self, id: i32) -> Result<bool> {
        self.product_repo().delete(id).await
    }

    pub async fn toggle_product_availability(&self, id: i32) -> Result<Option<Product>> {
        self.product_repo().toggle_availability(id).await
    }

    // ------------------------------------------------------------------
    // Carts
    // ------------------------------------------------------------------

    pub async fn find_cart(&self, user_id: i32) -> Result<Option<Cart>> {
        self.cart_repo().find(user_id).await
    }

    pub async fn get_or_create_cart(&self, user_id: i32) -> Result<Cart> {
        self.cart_repo().get_or_create(user_id).await
    }

    pub async fn cart_insert_line(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
        price: f64,
    ) -> Result<()> {
        self.cart_repo()
            .insert_line(cart_id, product_id, quantity, price)
            .await
    }

    pub async fn cart_set_line_quantity(&self, line_id: i32, quantity: i32) -> Result<()> {
        self.cart_repo().set_line_quantity(line_id, quantity).await
    }

    pub async fn cart_delete_line(&self, cart_id: i32, line_id: i32) -> Result<()> {
        self.cart_repo().delete_line(cart_id, line_id).await
    }

    pub async fn cart_clear_lines(&self, cart_id: i32) -> Result<()> {
        self.cart_repo().clear_lines(cart_id).await
    }

    pub async fn cart_save_total(&self, cart_id: i32, total: f64) -> Result<()> {
        self.cart_repo().save_total(cart_id, total).await
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    pub async fn checkout_order(&self, input: NewOrder) -> Result<i32, StockGuardError> {
        self.order_repo().checkout(input).await
    }

    pub async fn get_order(&self, id: i32) -> Result<Option<Order>> {
        self.order_repo().get(id).await
    }

    pub async fn orders_by_buyer(&self, buyer_id: i32) -> Result<Vec<Order>> {
        self.order_repo().list_by_buyer(buyer_id).await
    }

    pub async fn orders_by_farmer(&self, farmer_id: i32) -> Result<Vec<Order>> {
        self.order_repo().list_by_farmer(farmer_id).await
    }

    pub async fn set_order_status(&self, id: i32, status: OrderStatus) -> Result<()> {
        self.order_repo().set_status(id, status).await
    }

    pub async fn cancel_order_and_restock(&self, id: i32) -> Result<()> {
        self.order_repo().cancel_and_restock(id).await
    }

    pub async fn farmer_order_stats(&self, farmer_id: i32) -> Result<FarmerStats> {
        self.order_repo().stats_for_farmer(farmer_id).await
    }
}
