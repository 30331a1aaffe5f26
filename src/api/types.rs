use serde::{Deserialize, Serialize};

use crate::models::cart::{Cart, CartLine, ProductRef};
use crate::models::order::{
    DeliveryAddress, FarmerStats, Order, OrderItem, OrderStatus, PaymentMethod,
};
use crate::models::product::{Category, Product, Unit};
use crate::models::user::{PartyRef, Role, User};

/// Response envelope shared by every endpoint:
/// `{success, message?, data?, count?, error?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            count: None,
            error: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            count: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            count: None,
            error: None,
        }
    }

    pub fn failure_with_error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            count: None,
            error: Some(error.into()),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List envelope carrying `count` alongside the data.
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            message: None,
            count: Some(items.len()),
            data: Some(items),
            error: None,
        }
    }
}

// ============================================================================
// Wire DTOs (Spanish field names, as the API has always exposed them)
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub nombre: String,
    pub email: String,
    pub rol: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nombre: user.name,
            email: user.email,
            rol: user.role,
            telefono: user.phone,
            direccion: user.address,
            avatar: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

/// Register/login payload: identity plus the Bearer token.
#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub id: i32,
    pub nombre: String,
    pub email: String,
    pub rol: Role,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDto {
    pub id: i32,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

impl From<PartyRef> for PartyDto {
    fn from(party: PartyRef) -> Self {
        Self {
            id: party.id,
            nombre: party.name,
            email: party.email,
            telefono: party.phone,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,
    pub cantidad: i32,
    pub unidad: Unit,
    pub categoria: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
    pub disponible: bool,
    pub agricultor_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agricultor: Option<PartyDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_cosecha: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            nombre: product.name,
            descripcion: product.description,
            precio: product.price,
            cantidad: product.quantity,
            unidad: product.unit,
            categoria: product.category,
            imagen: product.image_url,
            disponible: product.available,
            agricultor_id: product.farmer_id,
            agricultor: product.farmer.map(PartyDto::from),
            ubicacion: product.location,
            fecha_cosecha: product.harvest_date,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRefDto {
    pub id: i32,
    pub nombre: String,
    pub precio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
    pub disponible: bool,
}

impl From<ProductRef> for ProductRefDto {
    fn from(product: ProductRef) -> Self {
        Self {
            id: product.id,
            nombre: product.name,
            precio: product.price,
            imagen: product.image_url,
            disponible: product.available,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub id: i32,
    pub producto_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producto: Option<ProductRefDto>,
    pub cantidad: i32,
    pub precio: f64,
}

impl From<CartLine> for CartItemDto {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            producto_id: line.product_id,
            producto: line.product.map(ProductRefDto::from),
            cantidad: line.quantity,
            precio: line.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    pub id: i32,
    pub usuario_id: i32,
    pub items: Vec<CartItemDto>,
    pub total: f64,
    pub updated_at: String,
}

impl From<Cart> for CartDto {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id,
            usuario_id: cart.user_id,
            items: cart.items.into_iter().map(CartItemDto::from).collect(),
            total: cart.total,
            updated_at: cart.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddressDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_postal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

impl From<DeliveryAddressDto> for DeliveryAddress {
    fn from(dto: DeliveryAddressDto) -> Self {
        Self {
            street: dto.calle,
            city: dto.ciudad,
            state: dto.estado,
            postal_code: dto.codigo_postal,
            phone: dto.telefono,
        }
    }
}

impl From<DeliveryAddress> for DeliveryAddressDto {
    fn from(address: DeliveryAddress) -> Self {
        Self {
            calle: address.street,
            ciudad: address.city,
            estado: address.state,
            codigo_postal: address.postal_code,
            telefono: address.phone,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: i32,
    pub producto_id: i32,
    pub nombre: String,
    pub cantidad: i32,
    pub precio: f64,
    pub subtotal: f64,
    pub agricultor_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agricultor: Option<PartyDto>,
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            producto_id: item.product_id,
            nombre: item.product_name,
            cantidad: item.quantity,
            precio: item.unit_price,
            subtotal: item.subtotal,
            agricultor_id: item.farmer_id,
            agricultor: item.farmer.map(PartyDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: i32,
    pub comprador_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comprador: Option<PartyDto>,
    pub items: Vec<OrderItemDto>,
    pub total: f64,
    pub estado: OrderStatus,
    pub direccion_entrega: DeliveryAddressDto,
    pub metodo_pago: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    pub fecha_pedido: String,
    pub fecha_entrega_estimada: String,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            comprador_id: order.buyer_id,
            comprador: order.buyer.map(PartyDto::from),
            items: order.items.into_iter().map(OrderItemDto::from).collect(),
            total: order.total,
            estado: order.status,
            direccion_entrega: order.delivery.into(),
            metodo_pago: order.payment_method,
            notas: order.notes,
            fecha_pedido: order.created_at,
            fecha_entrega_estimada: order.estimated_delivery,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerStatsDto {
    pub total_ventas: f64,
    pub total_productos: u64,
    pub pedidos_pendientes: u64,
    pub total_pedidos: u64,
}

impl From<FarmerStats> for FarmerStatsDto {
    fn from(stats: FarmerStats) -> Self {
        Self {
            total_ventas: stats.total_sales,
            total_productos: stats.product_count,
            pedidos_pendientes: stats.pending_orders,
            total_pedidos: stats.total_orders,
        }
    }
}
