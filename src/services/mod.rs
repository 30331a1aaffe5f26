pub mod auth_service;
pub mod auth_service_impl;
pub mod cart_service;
pub mod cart_service_impl;
pub mod email;
pub mod order_service;
pub mod order_service_impl;

pub use auth_service::{AuthError, AuthService, AuthSession, RegisterInput};
pub use auth_service_impl::SeaOrmAuthService;
pub use cart_service::{CartError, CartService};
pub use cart_service_impl::SeaOrmCartService;
pub use email::Mailer;
pub use order_service::{CheckoutInput, OrderError, OrderService};
pub use order_service_impl::SeaOrmOrderService;
