use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
};

use crate::{
    dto::reports::{PaymentMethodBreakdown, ReportQuery, SummaryReport, TimeSeries, TopDishes},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary))
        .route("/timeseries", get(timeseries))
        .route("/payment-methods", get(payment_methods))
        .route("/top-dishes", get(top_dishes))
        .route("/export.csv", get(export_csv))
        .route("/export.html", get(export_html))
}

#[utoipa::path(
    get,
    path = "/api/reports/summary",
    params(ReportQuery),
    responses(
        (status = 200, description = "Revenue and order totals for a date range", body = ApiResponse<SummaryReport>),
        (status = 400, description = "Invalid range"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<SummaryReport>>> {
    let resp = report_service::summary(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/timeseries",
    params(ReportQuery),
    responses(
        (status = 200, description = "Revenue bucketed by day, month, or year", body = ApiResponse<TimeSeries>),
        (status = 400, description = "Invalid range"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn timeseries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<TimeSeries>>> {
    let resp = report_service::timeseries(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/payment-methods",
    params(ReportQuery),
    responses(
        (status = 200, description = "Settled revenue split by payment method", body = ApiResponse<PaymentMethodBreakdown>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn payment_methods(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<PaymentMethodBreakdown>>> {
    let resp = report_service::payment_methods(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/top-dishes",
    params(ReportQuery),
    responses(
        (status = 200, description = "Best-selling dishes by quantity", body = ApiResponse<TopDishes>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn top_dishes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<TopDishes>>> {
    let resp = report_service::top_dishes(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/export.csv",
    params(ReportQuery),
    responses(
        (status = 200, description = "Line items for the range as CSV", content_type = "text/csv"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn export_csv(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let filename = format!("sales_{}_{}.csv", query.from, query.to);
    let csv = report_service::export_csv(&state, &user, query).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reports/export.html",
    params(ReportQuery),
    responses(
        (status = 200, description = "Printable sales report for the range", content_type = "text/html"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn export_html(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Html<String>> {
    let html = report_service::export_html(&state, &user, query).await?;
    Ok(Html(html))
}
