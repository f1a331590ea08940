use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    auth::hash_password,
    model::{
        CrudRepository, DatabaseError, Page, ResourceTyped,
        entity::{UserEntity, UserEntityCreateUpdate, UserSummaryRow},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::{
            admin::{PageQuery, UserCreateBody},
            auth::SessionUser,
        },
        error::ErrorResponse,
        extractors::ValidatedJson,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(admin_users_list_handler).post(admin_users_create_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    description = "Users newest first with enrollment and order counts",
    params(PageQuery),
    responses(
        (status = 200, description = "Users", body = Page<UserSummaryRow>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
async fn admin_users_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<PageQuery>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;
    let (limit, offset) = query.bounds();

    let items = UserSummaryRow::list(state.pool(), admin, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    let total = UserEntity::count(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(Page::new(items, total, limit, offset))))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    description = "Creates a user with any role",
    request_body = UserCreateBody,
    responses(
        (status = 201, description = "User created", body = SessionUser),
        (status = 400, description = "Invalid user data", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "admin"
)]
#[tracing::instrument(skip_all)]
async fn admin_users_create_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<UserCreateBody>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.require_admin()?;

    let found = UserEntity::find_by_email(state.pool(), admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let created = UserEntity::create(
        state.pool(),
        admin,
        UserEntityCreateUpdate {
            name: payload.name,
            email: payload.email,
            password_hash: hash,
            role: payload.role.unwrap_or(UserRole::Student),
        },
    )
    .await
    .map_err(|e| match e {
        DatabaseError::Conflict(_) => WebError::registration_conflict(),
        e => WebError::resource_fetch_error(UserEntity::get_resource_type(), e),
    })?;

    tracing::info!("admin {} created user {}", admin.user_id(), created.id());
    Ok((StatusCode::CREATED, Json(SessionUser::from(&created))))
}
