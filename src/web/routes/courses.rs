use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, CourseListingRow, Enrollment, Lesson},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::courses::{CatalogQuery, CourseDetail, FeaturedQuery},
        error::ErrorResponse,
        middlewares,
    },
};

const FEATURED_DEFAULT: i64 = 6;
const FEATURED_MAX: i64 = 50;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler))
        .route("/featured", get(courses_featured_handler))
        .route("/{slug}", get(courses_get_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    description = "Published catalog, newest first",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Published courses", body = Vec<CourseListingRow>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_list_handler(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> WebResult<impl IntoResponse> {
    let courses = CourseListingRow::search_published(
        state.pool(),
        &AuthenticatedUser::admin(),
        query.search.as_deref(),
        None,
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/featured",
    description = "Newest published courses for the landing page",
    params(FeaturedQuery),
    responses(
        (status = 200, description = "Featured courses", body = Vec<CourseListingRow>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_featured_handler(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> WebResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(FEATURED_DEFAULT).clamp(1, FEATURED_MAX);
    let courses =
        CourseListingRow::search_published(state.pool(), &AuthenticatedUser::admin(), None, Some(limit))
            .await
            .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{slug}",
    description = "Published course page with its lesson outline",
    params(
        ("slug" = String, Path, description = "Course slug")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseDetail),
        (status = 404, description = "Course not found or unpublished", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_get_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let system = AuthenticatedUser::admin();
    let course = Course::find_published_by_slug(state.pool(), &system, &slug)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let lessons = Lesson::all_by_course(state.pool(), &system, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let enrollments_count = Enrollment::count_for_course(state.pool(), &system, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let is_enrolled = match ctx.maybe_user() {
        Some(user) => Enrollment::exists(state.pool(), user, user.user_id(), course.id())
            .await
            .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?,
        None => false,
    };

    Ok((
        StatusCode::OK,
        Json(CourseDetail::new(&course, &lessons, enrollments_count, is_enrolled)),
    ))
}
