use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Duration;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    Config,
    auth::{self, UserClaims, generate_reset_token, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{PasswordResetToken, PasswordResetTokenCreate, UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::auth::{
            ForgotPasswordBody, LoginBody, MessageResponse, RegisterBody, RegisterResponse,
            ResetPasswordBody, SessionUser,
        },
        error::ErrorResponse,
        extractors::ValidatedJson,
        middlewares::{self, AUTH_TOKEN},
    },
};

const FORGOT_PASSWORD_MESSAGE: &str =
    "If this email is registered, a password reset link has been sent.";
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/session", get(auth_session_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/register", post(auth_register_handler))
        .route("/login", post(auth_login_handler))
        .route("/logout", post(auth_logout_handler))
        .route("/forgot-password", post(auth_forgot_password_handler))
        .route("/reset-password", post(auth_reset_password_handler))
        .merge(protected)
        .with_state(state)
}

pub(crate) async fn set_session_cookie(cookies: &Cookies, user_id: Uuid) -> WebResult<()> {
    let config = Config::get_or_init(false).await;
    let claims = UserClaims::for_user(user_id, Duration::days(config.app().session_days()));
    let token = auth::generate_token(claims, config.app().jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_secure(config.app().secure_cookies());
    cookie.set_max_age(tower_cookies::cookie::time::Duration::days(
        config.app().session_days(),
    ));
    cookies.add(cookie);
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    description = "Creates a student account",
    responses(
        (status = 201, description = "User created successfully", body = RegisterResponse),
        (status = 400, description = "Invalid registration data", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
async fn auth_register_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let created = UserEntity::create(
        state.pool(),
        &admin,
        UserEntityCreateUpdate {
            name: payload.name,
            email: payload.email,
            password_hash: hash,
            role: UserRole::Student,
        },
    )
    .await
    .map_err(|e| match e {
        crate::model::DatabaseError::Conflict(_) => WebError::registration_conflict(),
        e => WebError::resource_fetch_error(UserEntity::get_resource_type(), e),
    })?;

    tracing::info!("registered user {}", created.id());
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: String::from("Registration successful."),
            user_id: created.id(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    description = "Signs the user in and sets the session cookie",
    request_body = LoginBody,
    responses(
        (status = 200, description = "User signed in", body = SessionUser),
        (status = 400, description = "Malformed credentials", body = ErrorResponse),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[tracing::instrument(skip_all)]
async fn auth_login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    ValidatedJson(payload): ValidatedJson<LoginBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_invalid_credentials())?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    set_session_cookie(&cookies, found.id()).await?;
    Ok((StatusCode::OK, Json(SessionUser::from(&found))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    description = "Clears the session cookie",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
    ),
    tag = "auth",
)]
async fn auth_logout_handler(cookies: Cookies) -> WebResult<impl IntoResponse> {
    let mut cookie = Cookie::from(AUTH_TOKEN);
    cookie.set_path("/");
    cookies.remove(cookie);

    Ok((StatusCode::OK, Json(MessageResponse::new("Signed out."))))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    description = "Returns the signed-in user",
    responses(
        (status = 200, description = "Current user", body = SessionUser),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "auth",
)]
async fn auth_session_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_required())?;

    Ok((StatusCode::OK, Json(SessionUser::from(&found))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    description = "Issues a one-hour password reset token. The answer never reveals whether the email exists.",
    request_body = ForgotPasswordBody,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 400, description = "Malformed email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[tracing::instrument(skip_all)]
async fn auth_forgot_password_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_none() {
        return Ok((StatusCode::OK, Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))));
    }

    PasswordResetToken::delete_for_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(PasswordResetToken::get_resource_type(), e))?;

    let token = PasswordResetToken::create(
        state.pool(),
        &admin,
        PasswordResetTokenCreate {
            email: payload.email,
            token: generate_reset_token(),
            expires: chrono::Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(PasswordResetToken::get_resource_type(), e))?;

    // no mail transport yet, the link goes to the log
    let public_url = Config::get_or_init(false).await.app().public_url();
    tracing::info!(
        "password reset link for {}: {}/reset-password/{}",
        token.email(),
        public_url,
        token.token()
    );

    Ok((StatusCode::OK, Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    description = "Sets a new password using a reset token",
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Token missing, unknown or expired", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[tracing::instrument(skip_all)]
async fn auth_reset_password_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordBody>,
) -> WebResult<impl IntoResponse> {
    let token = payload
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(WebError::bad_request("Invalid token."))?;

    let admin = AuthenticatedUser::admin();
    let found = PasswordResetToken::find_by_token(state.pool(), &admin, token)
        .await
        .map_err(|e| WebError::resource_fetch_error(PasswordResetToken::get_resource_type(), e))?
        .ok_or(WebError::bad_request("Invalid or expired token."))?;

    if found.is_expired(chrono::Utc::now()) {
        found
            .delete(state.pool(), &admin)
            .await
            .map_err(|e| {
                WebError::resource_fetch_error(PasswordResetToken::get_resource_type(), e)
            })?;
        return Err(WebError::bad_request(
            "Token has expired, please request a new password reset.",
        ));
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    UserEntity::set_password_by_email(state.pool(), &admin, found.email(), &hash)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    found
        .delete(state.pool(), &admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(PasswordResetToken::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Password has been reset."))))
}
