use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::tables::{
        CreateFloorRequest, CreateTableRequest, FloorList, TableList, UpdateFloorRequest,
        UpdateTableRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Floor, RestaurantTable},
    response::ApiResponse,
    routes::params::FloorFilter,
    services::table_service,
    state::AppState,
};

pub fn floors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_floors))
        .route("/", post(create_floor))
        .route("/{id}", patch(update_floor))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables))
        .route("/", post(create_table))
        .route("/{id}", patch(update_table))
        .route("/{id}/qr", get(table_qr))
}

#[utoipa::path(
    get,
    path = "/api/floors",
    responses((status = 200, description = "List floors", body = ApiResponse<FloorList>)),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_floors(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<FloorList>>> {
    let resp = table_service::list_floors(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/floors",
    request_body = CreateFloorRequest,
    responses(
        (status = 200, description = "Create floor", body = ApiResponse<Floor>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn create_floor(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFloorRequest>,
) -> AppResult<Json<ApiResponse<Floor>>> {
    let resp = table_service::create_floor(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/floors/{id}",
    params(("id" = Uuid, Path, description = "Floor ID")),
    request_body = UpdateFloorRequest,
    responses(
        (status = 200, description = "Update floor", body = ApiResponse<Floor>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn update_floor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFloorRequest>,
) -> AppResult<Json<ApiResponse<Floor>>> {
    let resp = table_service::update_floor(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    params(("floor_id" = Option<Uuid>, Query, description = "Filter by floor")),
    responses((status = 200, description = "List tables", body = ApiResponse<TableList>)),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<FloorFilter>,
) -> AppResult<Json<ApiResponse<TableList>>> {
    let resp = table_service::list_tables(&state, filter.floor_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 200, description = "Create table", body = ApiResponse<RestaurantTable>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<Json<ApiResponse<RestaurantTable>>> {
    let resp = table_service::create_table(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Update table", body = ApiResponse<RestaurantTable>),
        (status = 400, description = "Table has an open order"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn update_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTableRequest>,
) -> AppResult<Json<ApiResponse<RestaurantTable>>> {
    let resp = table_service::update_table(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}/qr",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "QR code SVG for the table's ordering page"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn table_qr(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let svg = table_service::table_qr(&state, &user, id).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
