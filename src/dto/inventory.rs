use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::InventoryItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertInventoryRequest {
    pub menu_item_id: Uuid,
    pub low_stock_threshold: i32,
    pub initial_stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestockRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryList {
    pub items: Vec<InventoryItem>,
}
