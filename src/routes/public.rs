use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        menu::PublicMenu,
        orders::{OrderWithItems, PublicOrderRequest},
    },
    error::AppResult,
    response::ApiResponse,
    services::{menu_service, order_service},
    state::AppState,
};

/// Customer-facing endpoints reached by scanning a table QR code. No auth.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tables/{qr_token}", get(public_menu))
        .route("/orders", post(create_public_order))
}

#[utoipa::path(
    get,
    path = "/api/public/tables/{qr_token}",
    params(("qr_token" = Uuid, Path, description = "Token embedded in the table QR code")),
    responses(
        (status = 200, description = "Table details and the available menu", body = ApiResponse<PublicMenu>),
        (status = 404, description = "Unknown or retired token")
    ),
    tag = "Public"
)]
pub async fn public_menu(
    State(state): State<AppState>,
    Path(qr_token): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PublicMenu>>> {
    let resp = menu_service::public_menu(&state, qr_token).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/public/orders",
    request_body = PublicOrderRequest,
    responses(
        (status = 200, description = "Place an order from the customer's phone", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Validation failed or table occupied"),
        (status = 404, description = "Unknown token")
    ),
    tag = "Public"
)]
pub async fn create_public_order(
    State(state): State<AppState>,
    Json(payload): Json<PublicOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_public_order(&state, payload).await?;
    Ok(Json(resp))
}
