mod context;
pub use context::{AuthenticatedUser, RequestContext, UserRole};

mod error;
pub use error::{WebError, WebResult};

pub mod cart_cookie;
pub mod dto;
pub mod extractors;
pub mod middlewares;

mod state;
pub use state::AppState;

pub mod routes;

pub mod doc;
