use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{
            Course, Enrollment, Lesson, LessonProgress, LessonWithProgressRow, StudentCourseRow,
            UserEntity,
        },
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            auth::MessageResponse,
            student::{
                LearnQuery, LearnView, PasswordChangeBody, ProfileBody, ProfileResponse,
                ProfileUser, ProgressBody, ProgressResponse, StudentCourse,
            },
        },
        error::ErrorResponse,
        extractors::ValidatedJson,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/courses", get(student_courses_handler))
        .route("/courses/{course_id}/learn", get(student_learn_handler))
        .route("/progress", post(student_progress_handler))
        .route("/profile", put(student_profile_handler))
        .route("/password", put(student_password_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/student/courses",
    description = "Courses the signed-in user is enrolled in, with completion progress",
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<StudentCourse>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "student"
)]
async fn student_courses_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = StudentCourseRow::for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let courses: Vec<StudentCourse> = rows.into_iter().map(StudentCourse::from).collect();
    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/courses/{course_id}/learn",
    description = "Lesson player data. Only enrolled users see it.",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        LearnQuery
    ),
    responses(
        (status = 200, description = "Lesson player", body = LearnView),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Course or lesson not found, or not enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "student"
)]
async fn student_learn_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(course_id): Path<Uuid>,
    Query(query): Query<LearnQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let is_enrolled = Enrollment::exists(state.pool(), user, user.user_id(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    if !is_enrolled {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    let course = Course::find_by_id(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let requested = match query.lesson.as_deref().filter(|l| !l.is_empty()) {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| WebError::resource_not_found(Lesson::get_resource_type()))?,
        ),
        None => None,
    };

    let lessons = LessonWithProgressRow::all_by_course(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let view = LearnView::build(&course, lessons, requested)
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;
    Ok((StatusCode::OK, Json(view)))
}

#[utoipa::path(
    post,
    path = "/api/v1/student/progress",
    description = "Marks a lesson as completed or not completed",
    request_body = ProgressBody,
    responses(
        (status = 200, description = "Progress saved", body = ProgressResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Not enrolled in the lesson's course", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "student"
)]
#[tracing::instrument(skip_all)]
async fn student_progress_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<ProgressBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let lesson = Lesson::find_by_id(state.pool(), user, payload.lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    let is_enrolled = Enrollment::exists(state.pool(), user, user.user_id(), lesson.course_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    if !is_enrolled {
        return Err(WebError::resource_forbidden(Lesson::get_resource_type()));
    }

    let progress = LessonProgress::upsert(state.pool(), user, lesson.id(), payload.is_completed)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ProgressResponse { progress })))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/profile",
    description = "Renames the signed-in user",
    request_body = ProfileBody,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Name is empty", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "student"
)]
async fn student_profile_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<ProfileBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(WebError::validation("Name is required."))?
        .to_string();

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_required())?;

    let mut data = found.as_update();
    data.name = name;
    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            user: ProfileUser::from(&updated),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/password",
    description = "Changes the password after checking the current one",
    request_body = PasswordChangeBody,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password wrong or new password too short", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "student"
)]
#[tracing::instrument(skip_all)]
async fn student_password_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<PasswordChangeBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_required())?;

    let is_verified = verify_password(found.hash(), &payload.current_password)
        .map_err(WebError::server_crypt_error)?;
    if !is_verified {
        return Err(WebError::bad_request("Current password is incorrect."));
    }

    let mut data = found.as_update();
    data.password_hash =
        hash_password(&payload.new_password).map_err(WebError::server_crypt_error)?;
    found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    tracing::info!("user {} changed password", user.user_id());
    Ok((StatusCode::OK, Json(MessageResponse::new("Password changed."))))
}
