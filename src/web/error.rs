use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType},
    storage::StorageError,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationCookieInvalid, cookie: {cookie}. Error: {error}")]
    AuthenticationCookieInvalid {
        cookie: String,
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationAdminRequired")]
    AuthenticationAdminRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceConflict: {resource_type:?}")]
    ResourceConflict { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("RequestBadRequest: {message}")]
    RequestBadRequest { message: String },

    #[error("RequestValidation: {message}")]
    RequestValidation { message: String },
}

#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("CommerceAlreadyEnrolled")]
    AlreadyEnrolled,
    #[error("CommerceAlreadyInCart")]
    AlreadyInCart,
    #[error("CommerceEmptyCart")]
    EmptyCart,
    #[error("CommerceNothingPurchasable")]
    NothingPurchasable,
    #[error("CommerceCoursesOwned")]
    CoursesOwned,
    #[error("CommerceMissingSlip")]
    MissingSlip,
    #[error("CommerceInvalidSlip")]
    InvalidSlip,
    #[error("CommerceTotalTooLarge")]
    TotalTooLarge,
    #[error("CommerceOrderNotPending, status: {status}")]
    OrderNotPending { status: String },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] CryptError),
    #[error("ServerStorageError: {0}")]
    ServerStorageError(#[from] StorageError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerCryptError(_) => String::from("Internal server error."),
            Self::ServerStorageError(_) => String::from("Unable to store the uploaded file."),
        }
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => String::from("This email is already registered."),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationAdminRequired => StatusCode::FORBIDDEN,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationCookieInvalid { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationCookieInvalid { .. } => {
                String::from("Authentication error, cookie invalid.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationAdminRequired => String::from("Administrator access required."),
            Self::AuthenticationInvalidCredentials => {
                String::from("Invalid email or password.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceConflict { .. } => String::from("Resource error, resource already exists."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
        }
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RequestBadRequest { message } | Self::RequestValidation { message } => {
                message.clone()
            }
        }
    }
}

impl CommerceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AlreadyEnrolled | Self::AlreadyInCart => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyEnrolled => "ALREADY_ENROLLED",
            Self::AlreadyInCart => "ALREADY_IN_CART",
            Self::EmptyCart => "EMPTY_CART",
            Self::NothingPurchasable => "NOTHING_PURCHASABLE",
            Self::CoursesOwned => "COURSES_OWNED",
            Self::MissingSlip => "MISSING_SLIP",
            Self::InvalidSlip => "INVALID_SLIP",
            Self::TotalTooLarge => "TOTAL_TOO_LARGE",
            Self::OrderNotPending { .. } => "ORDER_NOT_PENDING",
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AlreadyEnrolled => String::from("You are already enrolled in this course."),
            Self::AlreadyInCart => String::from("This course is already in your cart."),
            Self::EmptyCart => String::from("Your cart is empty."),
            Self::NothingPurchasable => String::from("None of the courses in your cart are available."),
            Self::CoursesOwned => {
                String::from("Your cart contains a course you are already enrolled in.")
            }
            Self::MissingSlip => String::from("A payment slip is required."),
            Self::InvalidSlip => {
                String::from("The payment slip must be a PNG, JPEG, WebP or GIF image.")
            }
            Self::TotalTooLarge => String::from("The order total is too large."),
            Self::OrderNotPending { status } => {
                format!("This order has already been processed ({status}).")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("RequestError - {0}")]
    RequestError(#[from] RequestError),
    #[error("CommerceError - {0}")]
    CommerceError(#[from] CommerceError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        match error {
            DatabaseError::Conflict(_) => Self::ResourceError(ResourceError::ResourceConflict {
                resource_type: r#type,
            }),
            DatabaseError::Forbidden => Self::resource_forbidden(r#type),
            DatabaseError::InvalidTransition { from } => {
                Self::CommerceError(CommerceError::OrderNotPending { status: from })
            }
            DatabaseError::AmountOverflow => Self::CommerceError(CommerceError::TotalTooLarge),
            error => Self::ResourceError(ResourceError::ResourceFetchError {
                resource_type: r#type,
                error,
            }),
        }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::RequestError(RequestError::RequestBadRequest {
            message: message.into(),
        })
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::RequestError(RequestError::RequestValidation {
            message: message.into(),
        })
    }

    pub fn auth_cookie_invalid<S: Into<String>>(
        cookie: S,
        error: jsonwebtoken::errors::Error,
    ) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieInvalid {
            cookie: cookie.into(),
            error,
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn admin_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationAdminRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn server_storage_error(e: StorageError) -> Self {
        Self::ServerError(ServerError::ServerStorageError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::RequestError(e) => e.status_code(),
            Self::CommerceError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::RequestError(e) => e.client_display(),
            Self::CommerceError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }

    pub fn client_code(&self) -> Option<&'static str> {
        match self {
            Self::CommerceError(e) => Some(e.code()),
            _ => None,
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Machine-readable refusal code, e.g. `ALREADY_IN_CART`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            code: self.client_code().map(String::from),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
