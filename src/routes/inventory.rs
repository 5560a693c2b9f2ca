use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{InventoryList, RestockRequest, UpsertInventoryRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::InventoryItem,
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/", put(upsert_inventory))
        .route("/low-stock", get(list_low_stock))
        .route("/{id}/restock", post(restock))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "List stock levels", body = ApiResponse<InventoryList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_inventory(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    responses(
        (status = 200, description = "Items at or below threshold", body = ApiResponse<InventoryList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_low_stock(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/inventory",
    request_body = UpsertInventoryRequest,
    responses(
        (status = 200, description = "Create or reconfigure stock tracking", body = ApiResponse<InventoryItem>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Menu item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn upsert_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpsertInventoryRequest>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let resp = inventory_service::upsert_inventory(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/restock",
    params(("id" = Uuid, Path, description = "Inventory ID")),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Add stock", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn restock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let resp = inventory_service::restock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
