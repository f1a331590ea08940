use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, Page, ResourceTyped,
        entity::{Course, CourseListingRow, Lesson},
    },
    utils::slug::generate_slug,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            admin::{
                AdminCourseView, CourseCreateBody, CourseUpdateBody, LessonCreateBody,
                LessonUpdateBody, PageQuery, ReorderBody,
            },
            cart::SuccessResponse,
        },
        error::ErrorResponse,
        extractors::ValidatedJson,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/",
            get(admin_courses_list_handler).post(admin_courses_create_handler),
        )
        .route(
            "/{id}",
            get(admin_courses_get_handler)
                .put(admin_courses_update_handler)
                .delete(admin_courses_delete_handler),
        )
        .route("/{id}/lessons", post(admin_lessons_create_handler))
        .route("/{id}/lessons/reorder", put(admin_lessons_reorder_handler))
        .route(
            "/{id}/lessons/{lesson_id}",
            put(admin_lessons_update_handler).delete(admin_lessons_delete_handler),
        )
        .with_state(state)
}

async fn find_course(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Course> {
    let admin = ctx.require_admin()?;
    Course::find_by_id(state.pool(), admin, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))
}

async fn find_lesson(
    state: &AppState,
    ctx: &RequestContext,
    course_id: Uuid,
    lesson_id: Uuid,
) -> WebResult<Lesson> {
    let admin = ctx.require_admin()?;
    Lesson::find_in_course(state.pool(), admin, course_id, lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses",
    description = "Every course, drafts included, newest first",
    params(PageQuery),
    responses(
        (status = 200, description = "Courses", body = Page<CourseListingRow>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_courses_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<PageQuery>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;
    let (limit, offset) = query.bounds();

    let items = CourseListingRow::list_all(state.pool(), admin, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    let total = Course::count(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(Page::new(items, total, limit, offset))))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses",
    description = "Creates a course; the slug is derived from the title",
    request_body = CourseCreateBody,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid course data", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
#[tracing::instrument(skip_all)]
async fn admin_courses_create_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CourseCreateBody>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;
    let slug = generate_slug(&payload.title, chrono::Utc::now().timestamp_millis());

    let course = Course::create(state.pool(), admin, payload.into_create(slug))
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!("course {} created as {}", course.id(), course.slug());
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses/{id}",
    description = "Course with its ordered lessons",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course found", body = AdminCourseView),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_courses_get_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    let lessons = Lesson::all_by_course(state.pool(), ctx.require_admin()?, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(AdminCourseView { course, lessons })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/courses/{id}",
    description = "Partial course update",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = CourseUpdateBody,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid course data", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_courses_update_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CourseUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    let data = payload.apply(course.as_update());

    let updated = course
        .update(state.pool(), ctx.require_admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/courses/{id}",
    description = "Deletes a course with its lessons, enrollments and order lines",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course deleted", body = SuccessResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
#[tracing::instrument(skip_all)]
async fn admin_courses_delete_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    course
        .delete(state.pool(), ctx.require_admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!("course {id} deleted");
    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses/{id}/lessons",
    description = "Appends a lesson to the course",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = LessonCreateBody,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 400, description = "Title or video URL missing", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_lessons_create_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<LessonCreateBody>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    let lesson = Lesson::create(
        state.pool(),
        ctx.require_admin()?,
        payload.into_create(course.id()),
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/courses/{id}/lessons/{lesson_id}",
    description = "Partial lesson update",
    params(
        ("id" = Uuid, Path, description = "Course ID"),
        ("lesson_id" = Uuid, Path, description = "Lesson ID")
    ),
    request_body = LessonUpdateBody,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 400, description = "Invalid lesson data", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Lesson not found in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_lessons_update_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((id, lesson_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<LessonUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id, lesson_id).await?;
    let data = payload.apply(lesson.as_update());

    let updated = lesson
        .update(state.pool(), ctx.require_admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/courses/{id}/lessons/{lesson_id}",
    description = "Deletes a lesson with its progress records",
    params(
        ("id" = Uuid, Path, description = "Course ID"),
        ("lesson_id" = Uuid, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Lesson deleted", body = SuccessResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Lesson not found in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_lessons_delete_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((id, lesson_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id, lesson_id).await?;
    lesson
        .delete(state.pool(), ctx.require_admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/courses/{id}/lessons/reorder",
    description = "Sets lesson positions in one transaction. Lessons of other courses are ignored.",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = ReorderBody,
    responses(
        (status = 200, description = "Lessons reordered", body = SuccessResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_lessons_reorder_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderBody>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    let positions: Vec<(Uuid, i32)> = payload
        .lessons
        .iter()
        .map(|l| (l.id, l.position))
        .collect();

    Lesson::reorder(state.pool(), ctx.require_admin()?, course.id(), &positions)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}
