use std::path::Path;

use crate::{
    Config,
    storage::UPLOADS_ROUTE,
    web::{AppState, doc::ApiDoc, middlewares},
};
use axum::{Router, middleware};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod courses;
pub mod orders;
pub mod student;

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let frontend_dir = config.app().frontend_dir();
    let index = Path::new(frontend_dir).join("index.html");
    let frontend = Router::new()
        .fallback_service(ServeDir::new(frontend_dir).fallback(ServeFile::new(index)))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::page_guard_fn,
        ));

    let mut router = Router::new()
        .nest("/api/v1/auth", auth::routes(state.clone()))
        .nest("/api/v1/courses", courses::routes(state.clone()))
        .nest("/api/v1/cart", cart::routes(state.clone()))
        .nest(
            "/api/v1/orders",
            orders::routes(state.clone(), config.storage().max_slip_bytes()),
        )
        .nest("/api/v1/student", student::routes(state.clone()))
        .nest("/api/v1/admin", admin::routes(state.clone()))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(config.storage().uploads_dir()))
        .merge(frontend);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
