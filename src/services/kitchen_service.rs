use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{KitchenBoard, KitchenOrder, OrderWithItems, PrepareRequest},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        restaurant_tables::{
            ActiveModel as TableActive, Column as TableCol, Entity as RestaurantTables,
        },
    },
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, Capability, ensure},
    models::{OrderPriority, OrderStatus, TableStatus},
    response::{ApiResponse, Meta},
    services::order_service::{order_from_entity, order_item_from_entity, parse_status},
    state::AppState,
};

/// Open orders with their items, oldest first, each tagged with a purely
/// age-derived priority tier.
pub async fn board(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<KitchenBoard>> {
    ensure(user, Capability::UpdateKitchen)?;

    let open = [
        OrderStatus::Active.as_str(),
        OrderStatus::Ongoing.as_str(),
        OrderStatus::Serving.as_str(),
    ];
    let orders = Orders::find()
        .filter(OrderCol::Status.is_in(open))
        .order_by_asc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<Uuid, Vec<_>> = HashMap::new();
    if !order_ids.is_empty() {
        for item in OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(order_ids))
            .order_by_asc(OrderItemCol::CreatedAt)
            .all(&state.orm)
            .await?
        {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
    }

    let tables: HashMap<Uuid, i32> = RestaurantTables::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|t| (t.id, t.table_number))
        .collect();

    let now = Utc::now();
    let mut cards = Vec::with_capacity(orders.len());
    for order in orders {
        let items: Vec<_> = items_by_order
            .remove(&order.id)
            .unwrap_or_default()
            .into_iter()
            .map(order_item_from_entity)
            .collect();
        let prepared_count = items.iter().filter(|i| i.prepared).count() as i32;
        let total_count = items.len() as i32;
        let table_number = tables.get(&order.table_id).copied().unwrap_or(0);
        let age_minutes = (now - order.created_at.with_timezone(&Utc)).num_minutes();
        cards.push(KitchenOrder {
            order: order_from_entity(order)?,
            items,
            table_number,
            prepared_count,
            total_count,
            age_minutes,
            priority: OrderPriority::for_age_minutes(age_minutes),
        });
    }

    Ok(ApiResponse::success(
        "Kitchen board",
        KitchenBoard { items: cards },
        Some(Meta::empty()),
    ))
}

/// Toggle one line item's prepared flag. When the toggle-on leaves no
/// unprepared items and the order is not already serving, the order and its
/// table are promoted to serving in the same transaction; a repeat toggle on
/// an already-all-prepared order does not re-fire the promotion.
pub async fn toggle_prepared(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: PrepareRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure(user, Capability::UpdateKitchen)?;

    let txn = state.orm.begin().await?;

    let item = OrderItems::find()
        .filter(OrderItemCol::Id.eq(item_id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    // Lock the order row so concurrent toggles on sibling items serialize.
    let order = Orders::find()
        .filter(OrderCol::Id.eq(item.order_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let status = parse_status(&order.status)?;
    if status == OrderStatus::Completed {
        return Err(AppError::BadRequest("Order is already settled".into()));
    }

    let mut item_active: OrderItemActive = item.into();
    item_active.prepared = Set(payload.prepared);
    item_active.prepared_at = Set(payload.prepared.then(|| Utc::now().into()));
    let item = item_active.update(&txn).await?;

    let mut promoted_table = None;
    let order = if payload.prepared && status != OrderStatus::Serving {
        let unprepared = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .filter(OrderItemCol::Prepared.eq(false))
            .all(&txn)
            .await?;
        if unprepared.is_empty() {
            let table_id = order.table_id;
            let mut order_active: OrderActive = order.into();
            order_active.status = Set(OrderStatus::Serving.as_str().into());
            order_active.updated_at = Set(Utc::now().into());
            let order = order_active.update(&txn).await?;

            if let Some(table) = RestaurantTables::find()
                .filter(TableCol::Id.eq(table_id))
                .lock(LockType::Update)
                .one(&txn)
                .await?
            {
                let mut table_active: TableActive = table.into();
                table_active.status = Set(TableStatus::Serving.as_str().into());
                let table = table_active.update(&txn).await?;
                promoted_table = Some(table.id);
            }
            order
        } else {
            order
        }
    } else {
        order
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&txn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    txn.commit().await?;

    state
        .events
        .publish(Collection::OrderItems, item.id, ChangeAction::Updated);
    state
        .events
        .publish(Collection::Orders, order.id, ChangeAction::Updated);
    if let Some(table_id) = promoted_table {
        state
            .events
            .publish(Collection::RestaurantTables, table_id, ChangeAction::Updated);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "item_prepared_toggle",
        Some("order_items"),
        Some(serde_json::json!({
            "item_id": item.id,
            "order_id": order.id,
            "prepared": item.prepared,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Item updated",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}
