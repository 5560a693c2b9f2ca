use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::menu::{
        CategoryList, CategoryWithItems, CreateCategoryRequest, CreateMenuItemRequest,
        MenuItemList, PublicMenu, UpdateCategoryRequest, UpdateMenuItemRequest,
    },
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        menu_items::{
            ActiveModel as MenuItemActive, Column as MenuCol, Entity as MenuItems,
            Model as MenuItemModel,
        },
        restaurant_tables::{Column as TableCol, Entity as RestaurantTables},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure},
    models::{Category, DietaryTag, MenuItem},
    response::{ApiResponse, Meta},
    services::table_service::table_from_entity,
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::DisplayOrder)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure(user, Capability::ManageMenu)?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        display_order: Set(payload.display_order),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure(user, Capability::ManageMenu)?;

    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CategoryActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(order) = payload.display_order {
        active.display_order = Set(order);
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn list_menu_items(
    state: &AppState,
    category_id: Option<Uuid>,
) -> AppResult<ApiResponse<MenuItemList>> {
    let mut finder = MenuItems::find().order_by_asc(MenuCol::Name);
    if let Some(category_id) = category_id {
        finder = finder.filter(MenuCol::CategoryId.eq(category_id));
    }
    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ApiResponse::success(
        "Menu items",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure(user, Capability::ManageMenu)?;

    if payload.price < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }
    Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown category".into()))?;

    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        dietary_tag: Set(payload.dietary_tag.as_str().into()),
        available: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure(user, Capability::ManageMenu)?;

    let existing = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(category_id) = payload.category_id {
        Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest("Unknown category".into()))?;
    }
    if payload.price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }

    let mut active: MenuItemActive = existing.into();
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(tag) = payload.dietary_tag {
        active.dietary_tag = Set(tag.as_str().into());
    }
    if let Some(flag) = payload.available {
        active.available = Set(flag);
    }
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item updated",
        menu_item_from_entity(item)?,
        Some(Meta::empty()),
    ))
}

/// The customer ordering page: table info plus the active menu grouped by
/// category. Reached via the table's QR token, no authentication.
pub async fn public_menu(state: &AppState, qr_token: Uuid) -> AppResult<ApiResponse<PublicMenu>> {
    let table = RestaurantTables::find()
        .filter(TableCol::QrToken.eq(qr_token))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !table.active {
        return Err(AppError::NotFound);
    }

    let categories = Categories::find()
        .filter(CategoryCol::Active.eq(true))
        .order_by_asc(CategoryCol::DisplayOrder)
        .all(&state.orm)
        .await?;

    let items = MenuItems::find()
        .filter(MenuCol::Available.eq(true))
        .order_by_asc(MenuCol::Name)
        .all(&state.orm)
        .await?;

    let mut grouped = Vec::with_capacity(categories.len());
    for category in categories {
        let category_items = items
            .iter()
            .filter(|i| i.category_id == category.id)
            .cloned()
            .map(menu_item_from_entity)
            .collect::<AppResult<Vec<_>>>()?;
        if !category_items.is_empty() {
            grouped.push(CategoryWithItems {
                category: category_from_entity(category),
                items: category_items,
            });
        }
    }

    Ok(ApiResponse::success(
        "Menu",
        PublicMenu {
            table: table_from_entity(table)?,
            categories: grouped,
        },
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        display_order: model.display_order,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn menu_item_from_entity(model: MenuItemModel) -> AppResult<MenuItem> {
    let dietary_tag = DietaryTag::parse(&model.dietary_tag)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown dietary tag")))?;
    Ok(MenuItem {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price: model.price,
        dietary_tag,
        available: model.available,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
