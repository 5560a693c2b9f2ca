use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Floor, RestaurantTable, TableStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFloorRequest {
    pub name: String,
    pub floor_number: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFloorRequest {
    pub name: Option<String>,
    pub floor_number: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FloorList {
    pub items: Vec<Floor>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub floor_id: Uuid,
    pub table_number: i32,
    pub capacity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    pub capacity: Option<i32>,
    /// Only `available`, `reserved` and `maintenance` may be set by hand;
    /// the order flows own `occupied` and `serving`.
    pub status: Option<TableStatus>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableList {
    pub items: Vec<RestaurantTable>,
}
