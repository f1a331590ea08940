use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, Enrollment, EnrollmentAdminRow, EnrollmentCreate, UserEntity, UserSummaryRow},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            admin::{EnrollOptions, EnrollmentCreateBody},
            cart::SuccessResponse,
        },
        error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/",
            get(admin_enrollments_list_handler).post(admin_enrollments_create_handler),
        )
        .route("/options", get(admin_enrollments_options_handler))
        .route("/{id}", delete(admin_enrollments_delete_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/enrollments",
    description = "All enrollments newest first",
    responses(
        (status = 200, description = "Enrollments", body = Vec<EnrollmentAdminRow>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_enrollments_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;
    let rows = EnrollmentAdminRow::list(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/enrollments/options",
    description = "Students and published courses to pick from when enrolling by hand",
    responses(
        (status = 200, description = "Choices", body = EnrollOptions),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_enrollments_options_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;
    let students = UserSummaryRow::students(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    let courses = Course::all_published(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(EnrollOptions { students, courses })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/enrollments",
    description = "Enrolls a user in a course without an order",
    request_body = EnrollmentCreateBody,
    responses(
        (status = 201, description = "Enrollment created", body = Enrollment),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "User or course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
#[tracing::instrument(skip_all)]
async fn admin_enrollments_create_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<EnrollmentCreateBody>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;

    UserEntity::find_by_id(state.pool(), admin, payload.user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;
    Course::find_by_id(state.pool(), admin, payload.course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let enrollment = Enrollment::create(
        state.pool(),
        admin,
        EnrollmentCreate {
            user_id: payload.user_id,
            course_id: payload.course_id,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    tracing::info!(
        "admin {} enrolled {} in {}",
        admin.user_id(),
        enrollment.user_id(),
        enrollment.course_id()
    );
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/enrollments/{id}",
    description = "Removes one enrollment",
    params(
        ("id" = Uuid, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 200, description = "Enrollment removed", body = SuccessResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
#[tracing::instrument(skip_all)]
async fn admin_enrollments_delete_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;
    let enrollment = Enrollment::find_by_id(state.pool(), admin, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Enrollment::get_resource_type()))?;

    enrollment
        .delete(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}
