use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    documents,
    dto::tables::{
        CreateFloorRequest, CreateTableRequest, FloorList, TableList, UpdateFloorRequest,
        UpdateTableRequest,
    },
    entity::{
        floors::{ActiveModel as FloorActive, Column as FloorCol, Entity as Floors,
            Model as FloorModel},
        restaurant_tables::{
            ActiveModel as TableActive, Column as TableCol, Entity as RestaurantTables,
            Model as TableModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure},
    models::{Floor, RestaurantTable, TableStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_floors(state: &AppState) -> AppResult<ApiResponse<FloorList>> {
    let items = Floors::find()
        .order_by_asc(FloorCol::FloorNumber)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(floor_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Floors",
        FloorList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_floor(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFloorRequest,
) -> AppResult<ApiResponse<Floor>> {
    ensure(user, Capability::ManageTables)?;

    let floor = FloorActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        floor_number: Set(payload.floor_number),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Floor created",
        floor_from_entity(floor),
        Some(Meta::empty()),
    ))
}

pub async fn update_floor(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateFloorRequest,
) -> AppResult<ApiResponse<Floor>> {
    ensure(user, Capability::ManageTables)?;

    let existing = Floors::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: FloorActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(number) = payload.floor_number {
        active.floor_number = Set(number);
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    let floor = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Floor updated",
        floor_from_entity(floor),
        Some(Meta::empty()),
    ))
}

pub async fn list_tables(
    state: &AppState,
    floor_id: Option<Uuid>,
) -> AppResult<ApiResponse<TableList>> {
    let mut condition = Condition::all();
    if let Some(floor_id) = floor_id {
        condition = condition.add(TableCol::FloorId.eq(floor_id));
    }
    let items = RestaurantTables::find()
        .filter(condition)
        .order_by_asc(TableCol::TableNumber)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(table_from_entity)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ApiResponse::success(
        "Tables",
        TableList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_table(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<RestaurantTable>> {
    ensure(user, Capability::ManageTables)?;

    if payload.capacity < 1 {
        return Err(AppError::BadRequest("Capacity must be at least 1".into()));
    }
    Floors::find_by_id(payload.floor_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown floor".into()))?;

    let table = TableActive {
        id: Set(Uuid::new_v4()),
        floor_id: Set(payload.floor_id),
        table_number: Set(payload.table_number),
        capacity: Set(payload.capacity),
        status: Set(TableStatus::Available.as_str().into()),
        qr_token: Set(Uuid::new_v4()),
        current_order_id: Set(None),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "table_create",
        Some("restaurant_tables"),
        Some(serde_json::json!({ "table_id": table.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Table created",
        table_from_entity(table)?,
        Some(Meta::empty()),
    ))
}

/// Manual table edits. Occupancy states belong to the order flows: a table
/// with an open order cannot be re-statused by hand, and `occupied`/`serving`
/// can never be set manually.
pub async fn update_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTableRequest,
) -> AppResult<ApiResponse<RestaurantTable>> {
    ensure(user, Capability::ManageTables)?;

    let existing = RestaurantTables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(status) = payload.status {
        if existing.current_order_id.is_some() {
            return Err(AppError::BadRequest(
                "Table has an open order; settle it first".into(),
            ));
        }
        if matches!(status, TableStatus::Occupied | TableStatus::Serving) {
            return Err(AppError::BadRequest(
                "Occupied and serving are set by the order flow".into(),
            ));
        }
    }

    let mut active: TableActive = existing.into();
    if let Some(capacity) = payload.capacity {
        if capacity < 1 {
            return Err(AppError::BadRequest("Capacity must be at least 1".into()));
        }
        active.capacity = Set(capacity);
    }
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().into());
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    let table = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Table updated",
        table_from_entity(table)?,
        Some(Meta::empty()),
    ))
}

/// QR image for the customer self-order entry point of this table.
pub async fn table_qr(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<String> {
    ensure(user, Capability::ManageTables)?;

    let table = RestaurantTables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let base = state.config.public_base_url.trim_end_matches('/');
    let url = format!("{}/order/{}", base, table.qr_token);
    documents::qr_svg(&url)
}

fn floor_from_entity(model: FloorModel) -> Floor {
    Floor {
        id: model.id,
        name: model.name,
        floor_number: model.floor_number,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn table_from_entity(model: TableModel) -> AppResult<RestaurantTable> {
    let status = TableStatus::parse(&model.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown table status")))?;
    Ok(RestaurantTable {
        id: model.id,
        floor_id: model.floor_id,
        table_number: model.table_number,
        capacity: model.capacity,
        status,
        qr_token: model.qr_token,
        current_order_id: model.current_order_id,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
