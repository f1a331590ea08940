use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{Order, OrderItemRow, OrderReviewRow},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::admin::{PaymentView, PaymentsQuery, ReviewAction, ReviewBody, ReviewResponse},
        error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(admin_payments_list_handler))
        .route("/{order_id}", put(admin_payments_review_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/payments",
    description = "Orders for payment review, newest first",
    params(PaymentsQuery),
    responses(
        (status = 200, description = "Orders with buyer, items and approver", body = Vec<PaymentView>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_payments_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<PaymentsQuery>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;

    let orders = OrderReviewRow::list(state.pool(), admin, query.status, None)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = OrderItemRow::for_orders(state.pool(), admin, &ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(PaymentView::zip(orders, items))))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/payments/{order_id}",
    description = "Approves or rejects a pending order. Approval enrolls the buyer in every ordered course.",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Order reviewed", body = ReviewResponse),
        (status = 400, description = "Unknown action or order not pending", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
#[tracing::instrument(skip_all)]
async fn admin_payments_review_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<ReviewBody>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;
    let order = Order::find_by_id(state.pool(), admin, order_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Order::get_resource_type()))?;

    let action = ReviewAction::parse(&payload.action)
        .ok_or(WebError::bad_request("Invalid action."))?;

    let reviewed = match action {
        ReviewAction::Approve => order.approve(state.pool(), admin).await,
        ReviewAction::Reject => {
            let reason = payload.reason.filter(|r| !r.trim().is_empty());
            order.reject(state.pool(), admin, reason).await
        }
    }
    .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    let status = reviewed
        .status()
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    tracing::info!("order {} set to {} by {}", reviewed.id(), status, admin.user_id());
    Ok((
        StatusCode::OK,
        Json(ReviewResponse {
            success: true,
            status,
        }),
    ))
}
