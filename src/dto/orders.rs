use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderPriority, OrderStatus, PaymentMethod};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CartLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub table_id: Uuid,
    pub customer_name: String,
    pub guest_count: i32,
    pub items: Vec<CartLine>,
}

/// Customer self-order, entered through the QR code on the table.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublicOrderRequest {
    pub qr_token: Uuid,
    pub customer_name: String,
    pub guest_count: i32,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    /// Required when method is `credit`.
    pub room_number: Option<String>,
    pub guest_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PrepareRequest {
    pub prepared: bool,
}

/// One card on the kitchen display.
#[derive(Debug, Serialize, ToSchema)]
pub struct KitchenOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub table_number: i32,
    pub prepared_count: i32,
    pub total_count: i32,
    pub age_minutes: i64,
    pub priority: OrderPriority,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KitchenBoard {
    pub items: Vec<KitchenOrder>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpiPayload {
    pub uri: String,
}
