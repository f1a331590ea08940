use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    model::{
        DatabaseError, ResourceTyped, ResourceType, check_access,
        entity::{Course, Enrollment, Order, OrderCreate, OrderItemRow},
    },
    storage::SlipStorage,
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult, cart_cookie,
        dto::orders::{CheckoutForm, OrderCreatedResponse, OrderView, OrdersResponse},
        error::{CommerceError, ErrorResponse},
        middlewares,
    },
};

const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes<S>(state: AppState, max_slip_bytes: usize) -> Router<S> {
    Router::new()
        .route("/", get(orders_list_handler).post(orders_create_handler))
        .route("/{id}", get(orders_get_handler))
        .layer(DefaultBodyLimit::max(max_slip_bytes + MULTIPART_OVERHEAD))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

pub(crate) async fn load_items(
    state: &AppState,
    actor: &AuthenticatedUser,
    orders: Vec<Order>,
) -> WebResult<Vec<OrderView>> {
    let ids: Vec<Uuid> = orders.iter().map(Order::id).collect();
    let items = OrderItemRow::for_orders(state.pool(), actor, &ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;
    Ok(OrderView::zip(orders, items))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    description = "Orders of the signed-in user, newest first",
    responses(
        (status = 200, description = "Orders with items", body = OrdersResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "orders"
)]
async fn orders_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let orders = Order::list_for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    let orders = load_items(&state, user, orders).await?;
    Ok((StatusCode::OK, Json(OrdersResponse { orders })))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    description = "One order; visible to its buyer and to admins",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order found", body = OrderView),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Order belongs to someone else", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "orders"
)]
async fn orders_get_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let order = Order::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Order::get_resource_type()))?;

    check_access(state.pool(), user, &order, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Order::get_resource_type())
            } else {
                WebError::resource_fetch_error(Order::get_resource_type(), e)
            }
        })?;

    let mut views = load_items(&state, user, vec![order]).await?;
    let view = views
        .pop()
        .ok_or(WebError::resource_not_found(Order::get_resource_type()))?;
    Ok((StatusCode::OK, Json(view)))
}

struct UploadedSlip {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_slip(mut multipart: Multipart) -> WebResult<Option<UploadedSlip>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::bad_request(e.body_text()))?
    {
        if field.name() != Some("slip") {
            continue;
        }

        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::bad_request(e.body_text()))?;

        if bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(UploadedSlip {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    description = "Checks out the cart with a payment slip. The order stays PENDING until an admin reviews it.",
    request_body(content = CheckoutForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Order created", body = OrderCreatedResponse),
        (status = 400, description = "Missing or non-image slip, empty cart or already owned course", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "orders"
)]
#[tracing::instrument(skip_all)]
async fn orders_create_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    cookies: Cookies,
    multipart: Multipart,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let slip = read_slip(multipart)
        .await?
        .ok_or(WebError::from(CommerceError::MissingSlip))?;
    let pathname = SlipStorage::slip_pathname(
        user.user_id(),
        chrono::Utc::now().timestamp_millis(),
        slip.file_name.as_deref(),
    )
    .ok_or(WebError::from(CommerceError::InvalidSlip))?;

    let ids = cart_cookie::read(&cookies);
    if ids.is_empty() {
        return Err(CommerceError::EmptyCart.into());
    }

    let courses = Course::find_published_in(state.pool(), user, &ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(ResourceType::Cart, e))?;
    if courses.is_empty() {
        return Err(CommerceError::NothingPurchasable.into());
    }

    let course_ids: Vec<Uuid> = courses.iter().map(Course::id).collect();
    let owned = Enrollment::enrolled_among(state.pool(), user, user.user_id(), &course_ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    if !owned.is_empty() {
        return Err(CommerceError::CoursesOwned.into());
    }

    let slip_url = state
        .slips()
        .put(&pathname, slip.content_type.as_deref(), slip.bytes)
        .await
        .map_err(WebError::server_storage_error)?;

    let order = Order::create(
        state.pool(),
        user,
        OrderCreate {
            user_id: user.user_id(),
            slip_url,
            items: courses.iter().map(|c| (c.id(), c.price())).collect(),
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    tracing::info!("order {} created by {}", order.id(), user.user_id());
    cart_cookie::clear(&cookies);

    let mut views = load_items(&state, user, vec![order]).await?;
    let order = views
        .pop()
        .ok_or(WebError::resource_not_found(Order::get_resource_type()))?;
    Ok((StatusCode::CREATED, Json(OrderCreatedResponse { order })))
}
