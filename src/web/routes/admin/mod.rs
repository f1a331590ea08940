use axum::{Router, middleware};

use crate::web::{AppState, middlewares};

pub mod courses;
pub mod enrollments;
pub mod payments;
pub mod stats;
pub mod users;

pub fn routes<S: Send + Sync + Clone + 'static>(state: AppState) -> Router<S> {
    Router::new()
        .nest("/stats", stats::routes(state.clone()))
        .nest("/users", users::routes(state.clone()))
        .nest("/courses", courses::routes(state.clone()))
        .nest("/enrollments", enrollments::routes(state.clone()))
        .nest("/payments", payments::routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            state,
            middlewares::extract_context_fn,
        ))
}
