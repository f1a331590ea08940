mod auth;
pub use auth::{AUTH_TOKEN, extract_context_fn, resolve_user};

mod page_guard;
pub use page_guard::{PageDecision, decide, page_guard_fn};
