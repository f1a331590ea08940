use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{DashboardCounters, Order, OrderItemRow, OrderReviewRow},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::admin::{PaymentView, StatsResponse},
        error::ErrorResponse,
    },
};

const RECENT_ORDERS: i64 = 5;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(admin_stats_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    description = "Dashboard counters and the most recent orders",
    responses(
        (status = 200, description = "Dashboard data", body = StatsResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_stats_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;

    let counters = DashboardCounters::collect(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    let recent = OrderReviewRow::list(state.pool(), admin, None, Some(RECENT_ORDERS))
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    let ids: Vec<Uuid> = recent.iter().map(|o| o.id).collect();
    let items = OrderItemRow::for_orders(state.pool(), admin, &ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(StatsResponse {
            counters,
            recent_orders: PaymentView::zip(recent, items),
        }),
    ))
}
