use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::inventory::{InventoryList, RestockRequest, UpsertInventoryRequest},
    entity::{
        inventory::{
            ActiveModel as InventoryActive, Column as InvCol, Entity as Inventory,
            Model as InventoryModel,
        },
        menu_items::Entity as MenuItems,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure},
    models::{InventoryItem, StockStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_inventory(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure(user, Capability::ManageInventory)?;

    let rows = Inventory::find()
        .find_also_related(MenuItems)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(inv, menu)| {
            let name = menu.map(|m| m.name).unwrap_or_default();
            inventory_item(inv, name)
        })
        .collect();

    Ok(ApiResponse::success(
        "Inventory",
        InventoryList { items },
        Some(Meta::empty()),
    ))
}

/// Items at or below their threshold, for the restocking view.
pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InventoryList>> {
    let resp = list_inventory(state, user).await?;
    let items = resp
        .data
        .map(|list| {
            list.items
                .into_iter()
                .filter(|i| i.status != StockStatus::InStock)
                .collect()
        })
        .unwrap_or_default();
    Ok(ApiResponse::success(
        "Low stock",
        InventoryList { items },
        Some(Meta::empty()),
    ))
}

/// Start (or re-configure) stock tracking for a menu item. At most one
/// inventory row exists per item.
pub async fn upsert_inventory(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertInventoryRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure(user, Capability::ManageInventory)?;

    if payload.low_stock_threshold < 0 {
        return Err(AppError::BadRequest("Threshold cannot be negative".into()));
    }
    if payload.initial_stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("Stock cannot be negative".into()));
    }

    let menu = MenuItems::find_by_id(payload.menu_item_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Inventory::find()
        .filter(InvCol::MenuItemId.eq(payload.menu_item_id))
        .one(&state.orm)
        .await?;

    let inv = match existing {
        Some(inv) => {
            let mut active: InventoryActive = inv.into();
            active.low_stock_threshold = Set(payload.low_stock_threshold);
            active.update(&state.orm).await?
        }
        None => {
            let initial = payload.initial_stock.unwrap_or(0);
            InventoryActive {
                id: Set(Uuid::new_v4()),
                menu_item_id: Set(payload.menu_item_id),
                total_quantity: Set(initial),
                current_stock: Set(initial),
                low_stock_threshold: Set(payload.low_stock_threshold),
                last_restocked_at: Set((initial > 0).then(|| Utc::now().into())),
                last_restocked_by: Set((initial > 0).then_some(user.user_id)),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    Ok(ApiResponse::success(
        "Inventory saved",
        inventory_item(inv, menu.name),
        Some(Meta::empty()),
    ))
}

/// Restock is strictly additive: quantity Q raises both the running total
/// and the shelf stock by Q and stamps the restock time and actor.
pub async fn restock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RestockRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure(user, Capability::ManageInventory)?;

    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "Restock quantity must be positive".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let inv = Inventory::find()
        .filter(InvCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let menu = MenuItems::find_by_id(inv.menu_item_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("inventory row has no menu item")))?;

    let new_stock = inv
        .current_stock
        .checked_add(payload.quantity)
        .ok_or_else(|| AppError::BadRequest("Restock quantity too large".into()))?;
    let new_total = inv
        .total_quantity
        .checked_add(payload.quantity)
        .ok_or_else(|| AppError::BadRequest("Restock quantity too large".into()))?;
    let mut active: InventoryActive = inv.into();
    let now = Utc::now();
    active.current_stock = Set(new_stock);
    active.total_quantity = Set(new_total);
    active.last_restocked_at = Set(Some(now.into()));
    active.last_restocked_by = Set(Some(user.user_id));
    let inv = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "inventory_restock",
        Some("inventory"),
        Some(serde_json::json!({
            "inventory_id": inv.id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Restocked",
        inventory_item(inv, menu.name),
        Some(Meta::empty()),
    ))
}

fn inventory_item(model: InventoryModel, menu_item_name: String) -> InventoryItem {
    let status = StockStatus::classify(model.current_stock, model.low_stock_threshold);
    InventoryItem {
        id: model.id,
        menu_item_id: model.menu_item_id,
        menu_item_name,
        total_quantity: model.total_quantity,
        current_stock: model.current_stock,
        low_stock_threshold: model.low_stock_threshold,
        status,
        last_restocked_at: model.last_restocked_at.map(|dt| dt.with_timezone(&Utc)),
        last_restocked_by: model.last_restocked_by,
    }
}
