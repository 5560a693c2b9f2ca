use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    documents,
    dto::orders::{
        CartLine, CreateOrderRequest, OrderList, OrderWithItems, PaymentRequest,
        PublicOrderRequest, UpdateOrderStatusRequest, UpiPayload,
    },
    entity::{
        inventory::{Column as InvCol, Entity as Inventory},
        menu_items::{Column as MenuCol, Entity as MenuItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        restaurant_tables::{
            ActiveModel as TableActive, Column as TableCol, Entity as RestaurantTables,
        },
    },
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, Capability, ensure, role_allows},
    models::{
        Order, OrderItem, OrderSource, OrderStatus, PaymentMethod, PaymentStatus, TableStatus,
    },
    money,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::settings_service,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure(user, Capability::TakeOrders)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(table_id) = query.table_id {
        condition = condition.add(OrderCol::TableId.eq(table_id));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure(user, Capability::TakeOrders)?;
    place_order(
        state,
        payload.table_id,
        payload.customer_name,
        payload.guest_count,
        payload.items,
        OrderSource::Staff,
        Some(user.user_id),
    )
    .await
}

/// Customer self-order path: the table is resolved from its QR token, and
/// the exact same pricing and stock policy applies as on the staff path.
pub async fn create_public_order(
    state: &AppState,
    payload: PublicOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let table = RestaurantTables::find()
        .filter(TableCol::QrToken.eq(payload.qr_token))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    place_order(
        state,
        table.id,
        payload.customer_name,
        payload.guest_count,
        payload.items,
        OrderSource::Customer,
        None,
    )
    .await
}

/// One transaction covers the order row, its line items, the table occupancy
/// flip and the inventory decrement. A failure in any write rolls back all
/// of them.
async fn place_order(
    state: &AppState,
    table_id: Uuid,
    customer_name: String,
    guest_count: i32,
    lines: Vec<CartLine>,
    source: OrderSource,
    created_by: Option<Uuid>,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let customer_name = customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(AppError::BadRequest("Customer name is required".into()));
    }
    if guest_count < 1 {
        return Err(AppError::BadRequest("Guest count must be at least 1".into()));
    }
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    if lines.iter().any(|l| l.quantity <= 0) {
        return Err(AppError::BadRequest("Cart has invalid quantity".into()));
    }

    let txn = state.orm.begin().await?;

    let table = RestaurantTables::find()
        .filter(TableCol::Id.eq(table_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !table.active {
        return Err(AppError::BadRequest("Table is not in service".into()));
    }
    let table_status = TableStatus::parse(&table.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown table status")))?;
    if table_status != TableStatus::Available {
        return Err(AppError::BadRequest(format!(
            "Table {} is not available",
            table.table_number
        )));
    }

    let settings = settings_service::load(&txn).await?;

    let ids: Vec<Uuid> = lines.iter().map(|l| l.menu_item_id).collect();
    let menu_rows = MenuItems::find()
        .filter(MenuCol::Id.is_in(ids))
        .all(&txn)
        .await?;

    let mut priced: Vec<(CartLine, String, i64)> = Vec::with_capacity(lines.len());
    for line in lines {
        let item = menu_rows
            .iter()
            .find(|m| m.id == line.menu_item_id)
            .ok_or_else(|| AppError::BadRequest("Unknown menu item in cart".into()))?;
        if !item.available {
            return Err(AppError::BadRequest(format!(
                "{} is currently unavailable",
                item.name
            )));
        }
        priced.push((line, item.name.clone(), item.price));
    }

    // Decrement tracked stock for every line, regardless of order source.
    for (menu_item_id, quantity, name) in stock_decrements(&priced) {
        let inv = Inventory::find()
            .filter(InvCol::MenuItemId.eq(menu_item_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        if let Some(inv) = inv {
            if inv.current_stock < quantity {
                return Err(AppError::BadRequest(format!(
                    "Insufficient stock for {}",
                    name
                )));
            }
            Inventory::update_many()
                .col_expr(
                    InvCol::CurrentStock,
                    Expr::col(InvCol::CurrentStock).sub(quantity),
                )
                .filter(InvCol::Id.eq(inv.id))
                .exec(&txn)
                .await?;
        }
    }

    let price_lines: Vec<(i64, i32)> = priced
        .iter()
        .map(|(line, _, price)| (*price, line.quantity))
        .collect();
    let totals = money::compute_totals(&price_lines, settings.tax_rate_bps);

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(build_order_number(order_id)),
        table_id: Set(table.id),
        customer_name: Set(customer_name),
        guest_count: Set(guest_count),
        subtotal: Set(totals.subtotal),
        tax: Set(totals.tax),
        total: Set(totals.total),
        status: Set(OrderStatus::Active.as_str().into()),
        source: Set(source.as_str().into()),
        payment_method: Set(None),
        payment_status: Set(PaymentStatus::Pending.as_str().into()),
        credit_room_number: Set(None),
        credit_guest_name: Set(None),
        created_by: Set(created_by),
        created_at: NotSet,
        updated_at: NotSet,
        completed_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(priced.len());
    for (line, name, price) in &priced {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(line.menu_item_id),
            name: Set(name.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(*price),
            total_price: Set(money::line_total(*price, line.quantity)),
            note: Set(line.note.clone()),
            prepared: Set(false),
            prepared_at: Set(None),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    let mut table_active: TableActive = table.into();
    table_active.status = Set(TableStatus::Occupied.as_str().into());
    table_active.current_order_id = Set(Some(order.id));
    let table = table_active.update(&txn).await?;

    txn.commit().await?;

    state
        .events
        .publish(Collection::Orders, order.id, ChangeAction::Created);
    for item in &items {
        state
            .events
            .publish(Collection::OrderItems, item.id, ChangeAction::Created);
    }
    state
        .events
        .publish(Collection::RestaurantTables, table.id, ChangeAction::Updated);

    if let Err(err) = log_audit(
        &state.pool,
        created_by,
        "order_create",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "source": source.as_str(),
            "total": order.total,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    // Waiters advance orders they took; kitchen staff press "ready to serve".
    if !role_allows(user.role, Capability::TakeOrders)
        && !role_allows(user.role, Capability::UpdateKitchen)
    {
        return Err(AppError::Forbidden);
    }

    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(OrderCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = parse_status(&order.status)?;
    let next = payload.status;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot move order from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    // Re-submitting the current status is a no-op; keeps the manual button
    // and the kitchen auto-promotion from tripping over each other.
    if current == next {
        txn.commit().await?;
        return Ok(ApiResponse::success(
            "Order status unchanged",
            order_from_entity(order)?,
            Some(Meta::empty()),
        ));
    }

    let table_id = order.table_id;
    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    // The table mirrors the serving state so the floor view matches.
    let mut table_changed = None;
    if next == OrderStatus::Serving {
        if let Some(table) = RestaurantTables::find()
            .filter(TableCol::Id.eq(table_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?
        {
            let mut table_active: TableActive = table.into();
            table_active.status = Set(TableStatus::Serving.as_str().into());
            let table = table_active.update(&txn).await?;
            table_changed = Some(table.id);
        }
    }

    txn.commit().await?;

    state
        .events
        .publish(Collection::Orders, order.id, ChangeAction::Updated);
    if let Some(table_id) = table_changed {
        state
            .events
            .publish(Collection::RestaurantTables, table_id, ChangeAction::Updated);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order status updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// Settle the bill. Completing the order and freeing its table happen in the
/// same transaction: both or neither.
pub async fn pay_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PaymentRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure(user, Capability::ProcessPayments)?;

    let (room_number, guest_name) = match payload.method {
        PaymentMethod::Credit => {
            let room = payload
                .room_number
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::BadRequest("Room number is required for credit".into())
                })?;
            let guest = payload
                .guest_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::BadRequest("Guest name is required for credit".into()))?;
            (Some(room.to_string()), Some(guest.to_string()))
        }
        _ => (None, None),
    };

    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(OrderCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = parse_status(&order.status)?;
    if current == OrderStatus::Completed {
        return Err(AppError::BadRequest("Order is already settled".into()));
    }
    if current != OrderStatus::Serving {
        return Err(AppError::BadRequest(
            "Order must be served before billing".into(),
        ));
    }

    let payment_status = match payload.method {
        PaymentMethod::Credit => PaymentStatus::Credit,
        _ => PaymentStatus::Paid,
    };

    let table_id = order.table_id;
    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Completed.as_str().into());
    active.payment_method = Set(Some(payload.method.as_str().into()));
    active.payment_status = Set(payment_status.as_str().into());
    active.credit_room_number = Set(room_number);
    active.credit_guest_name = Set(guest_name);
    active.completed_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    let table = RestaurantTables::find()
        .filter(TableCol::Id.eq(table_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order has no table")))?;
    let mut table_active: TableActive = table.into();
    table_active.status = Set(TableStatus::Available.as_str().into());
    table_active.current_order_id = Set(None);
    let table = table_active.update(&txn).await?;

    txn.commit().await?;

    state
        .events
        .publish(Collection::Orders, order.id, ChangeAction::Updated);
    state
        .events
        .publish(Collection::RestaurantTables, table.id, ChangeAction::Updated);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_paid",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "method": order.payment_method,
            "total": order.total,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment recorded",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// Printable bill for an order.
pub async fn bill_document(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<String> {
    ensure(user, Capability::ProcessPayments)?;
    let (order, items, table_number) = load_order_with_items(state, id).await?;
    let settings = settings_service::load(&state.orm).await?;
    Ok(documents::bill_html(&order, &items, &settings, table_number))
}

/// Kitchen order ticket.
pub async fn kot_document(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<String> {
    if !role_allows(user.role, Capability::TakeOrders)
        && !role_allows(user.role, Capability::UpdateKitchen)
    {
        return Err(AppError::Forbidden);
    }
    let (order, items, table_number) = load_order_with_items(state, id).await?;
    Ok(documents::kot_html(&order, &items, table_number))
}

/// UPI deep link for the order total, plus its QR rendering.
pub async fn upi_payload(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<(UpiPayload, String)> {
    ensure(user, Capability::ProcessPayments)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let settings = settings_service::load(&state.orm).await?;
    if settings.upi_vpa.is_empty() {
        return Err(AppError::BadRequest("UPI id is not configured".into()));
    }
    let uri = documents::upi_uri(
        &settings.upi_vpa,
        &settings.restaurant_name,
        order.total,
        &format!("Bill {}", order.order_number),
    );
    let svg = documents::qr_svg(&uri)?;
    Ok((UpiPayload { uri }, svg))
}

async fn load_order_with_items(
    state: &AppState,
    id: Uuid,
) -> AppResult<(OrderModel, Vec<OrderItemModel>, i32)> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    let table = RestaurantTables::find_by_id(order.table_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order has no table")))?;
    Ok((order, items, table.table_number))
}

pub(crate) fn parse_status(s: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(s)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown order status {s}")))
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = parse_status(&model.status)?;
    let source = OrderSource::parse(&model.source)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown order source")))?;
    let payment_status = PaymentStatus::parse(&model.payment_status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown payment status")))?;
    let payment_method = match model.payment_method.as_deref() {
        Some(m) => Some(
            PaymentMethod::parse(m)
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown payment method")))?,
        ),
        None => None,
    };
    Ok(Order {
        id: model.id,
        order_number: model.order_number,
        table_id: model.table_id,
        customer_name: model.customer_name,
        guest_count: model.guest_count,
        subtotal: model.subtotal,
        tax: model.tax,
        total: model.total,
        status,
        source,
        payment_method,
        payment_status,
        credit_room_number: model.credit_room_number,
        credit_guest_name: model.credit_guest_name,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
    })
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        name: model.name,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total_price: model.total_price,
        note: model.note,
        prepared: model.prepared,
        prepared_at: model.prepared_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Inventory rows are always locked in ascending menu item id order, so two
/// concurrent carts holding the same items in opposite order cannot deadlock.
fn stock_decrements(priced: &[(CartLine, String, i64)]) -> Vec<(Uuid, i32, &str)> {
    let mut wants: Vec<(Uuid, i32, &str)> = priced
        .iter()
        .map(|(line, name, _)| (line.menu_item_id, line.quantity, name.as_str()))
        .collect();
    wants.sort_by_key(|(id, _, _)| *id);
    wants
}

/// Order numbers take their uniqueness from the order id, not the clock, so
/// two orders placed in the same instant cannot collide.
fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("ORD-{}-{}", date, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(menu_item_id: Uuid, quantity: i32) -> (CartLine, String, i64) {
        (
            CartLine {
                menu_item_id,
                quantity,
                note: None,
            },
            "dish".into(),
            100,
        )
    }

    #[test]
    fn stock_locks_in_ascending_item_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let forward_lines = [line(a, 1), line(b, 2), line(c, 3)];
        let reversed_lines = [line(c, 3), line(b, 2), line(a, 1)];
        let forward = stock_decrements(&forward_lines);
        let reversed = stock_decrements(&reversed_lines);

        let forward_ids: Vec<Uuid> = forward.iter().map(|(id, _, _)| *id).collect();
        let reversed_ids: Vec<Uuid> = reversed.iter().map(|(id, _, _)| *id).collect();
        assert_eq!(forward_ids, reversed_ids);
        assert!(forward_ids.windows(2).all(|w| w[0] <= w[1]));

        // Quantities stay attached to their item.
        let (_, qty, _) = forward
            .iter()
            .find(|(id, _, _)| *id == c)
            .copied()
            .expect("item present");
        assert_eq!(qty, 3);
    }
}
