use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, DietaryTag, MenuItem, RestaurantTable};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub display_order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub display_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units.
    pub price: i64,
    pub dietary_tag: DietaryTag,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub dietary_tag: Option<DietaryTag>,
    pub available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemList {
    pub items: Vec<MenuItem>,
}

/// What the customer ordering page sees after scanning a table QR.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicMenu {
    pub table: RestaurantTable,
    pub categories: Vec<CategoryWithItems>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithItems {
    pub category: Category,
    pub items: Vec<MenuItem>,
}
