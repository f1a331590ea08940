use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    Config, auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, WebResult, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

pub async fn resolve_user(
    state: &AppState,
    cookies: &Cookies,
) -> WebResult<Option<AuthenticatedUser>> {
    let Some(token) = cookies.get(AUTH_TOKEN) else {
        return Ok(None);
    };

    let claims = auth::process_token(token.value(), Config::get_or_init(false).await.app().jwt())
        .map_err(|e| WebError::auth_cookie_invalid(AUTH_TOKEN, e))?;

    let Ok(id) = claims.claims.sub.parse::<uuid::Uuid>() else {
        tracing::warn!("session token carries a malformed subject");
        return Ok(None);
    };

    let found = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok(found.map(|user| AuthenticatedUser::new(id, user.role())))
}

pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let user = resolve_user(&state, &cookies).await?;
    req.extensions_mut().insert(RequestContext::new(user));
    Ok(next.run(req).await)
}
