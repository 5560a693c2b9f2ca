use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::orders::{KitchenBoard, OrderWithItems, PrepareRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::kitchen_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(board))
        .route("/items/{id}/prepared", patch(toggle_prepared))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/orders",
    responses(
        (status = 200, description = "Open orders, oldest first, with prep progress", body = ApiResponse<KitchenBoard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn board(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<KitchenBoard>>> {
    let resp = kitchen_service::board(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/kitchen/items/{id}/prepared",
    params(("id" = Uuid, Path, description = "Order item ID")),
    request_body = PrepareRequest,
    responses(
        (status = 200, description = "Mark a line item prepared or not", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Order already settled"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn toggle_prepared(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PrepareRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = kitchen_service::toggle_prepared(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
