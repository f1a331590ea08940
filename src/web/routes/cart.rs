use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use tower_cookies::Cookies;

use crate::{
    model::{
        CrudRepository, ResourceTyped, ResourceType,
        entity::{Course, Enrollment},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult, cart_cookie,
        dto::cart::{CartAddBody, CartRemoveQuery, CartResponse, SuccessResponse},
        error::{CommerceError, ErrorResponse},
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/",
            get(cart_get_handler)
                .post(cart_add_handler)
                .delete(cart_remove_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    description = "Published courses currently in the cart and their total price",
    responses(
        (status = 200, description = "Cart content", body = CartResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "cart"
)]
async fn cart_get_handler(
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let ids = cart_cookie::read(&cookies);
    let courses = Course::find_published_in(state.pool(), &AuthenticatedUser::admin(), &ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(ResourceType::Cart, e))?;

    Ok((StatusCode::OK, Json(CartResponse::new(&courses))))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart",
    description = "Adds a course to the cart",
    request_body = CartAddBody,
    responses(
        (status = 200, description = "Course added", body = SuccessResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "ALREADY_ENROLLED or ALREADY_IN_CART", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "cart"
)]
async fn cart_add_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    cookies: Cookies,
    Json(payload): Json<CartAddBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let is_enrolled = Enrollment::exists(state.pool(), user, user.user_id(), payload.course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    if is_enrolled {
        return Err(CommerceError::AlreadyEnrolled.into());
    }

    let mut ids = cart_cookie::read(&cookies);
    if ids.contains(&payload.course_id) {
        return Err(CommerceError::AlreadyInCart.into());
    }

    let course = Course::find_by_id(state.pool(), user, payload.course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    if !course.is_some_and(|c| c.is_published()) {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    ids.push(payload.course_id);
    cart_cookie::write(&cookies, &ids).await;

    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    description = "Removes a course from the cart",
    params(CartRemoveQuery),
    responses(
        (status = 200, description = "Course removed", body = SuccessResponse),
        (status = 400, description = "Missing course_id", body = ErrorResponse),
    ),
    tag = "cart"
)]
async fn cart_remove_handler(
    cookies: Cookies,
    Query(query): Query<CartRemoveQuery>,
) -> WebResult<impl IntoResponse> {
    let course_id = query
        .course_id
        .filter(|id| !id.is_empty())
        .ok_or(WebError::bad_request("Missing course_id."))?;

    let mut ids = cart_cookie::read(&cookies);
    ids.retain(|id| id.to_string() != course_id);
    cart_cookie::write(&cookies, &ids).await;

    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}
