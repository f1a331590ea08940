use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "Session JWT of the current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "learnhub", description = "Course catalog, checkout and learning API"),
    paths(
        crate::web::routes::auth::auth_register_handler,
        crate::web::routes::auth::auth_login_handler,
        crate::web::routes::auth::auth_logout_handler,
        crate::web::routes::auth::auth_session_handler,
        crate::web::routes::auth::auth_forgot_password_handler,
        crate::web::routes::auth::auth_reset_password_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_featured_handler,
        crate::web::routes::courses::courses_get_handler,
        crate::web::routes::cart::cart_get_handler,
        crate::web::routes::cart::cart_add_handler,
        crate::web::routes::cart::cart_remove_handler,
        crate::web::routes::orders::orders_list_handler,
        crate::web::routes::orders::orders_get_handler,
        crate::web::routes::orders::orders_create_handler,
        crate::web::routes::student::student_courses_handler,
        crate::web::routes::student::student_learn_handler,
        crate::web::routes::student::student_progress_handler,
        crate::web::routes::student::student_profile_handler,
        crate::web::routes::student::student_password_handler,
        crate::web::routes::admin::stats::admin_stats_handler,
        crate::web::routes::admin::users::admin_users_list_handler,
        crate::web::routes::admin::users::admin_users_create_handler,
        crate::web::routes::admin::courses::admin_courses_list_handler,
        crate::web::routes::admin::courses::admin_courses_create_handler,
        crate::web::routes::admin::courses::admin_courses_get_handler,
        crate::web::routes::admin::courses::admin_courses_update_handler,
        crate::web::routes::admin::courses::admin_courses_delete_handler,
        crate::web::routes::admin::courses::admin_lessons_create_handler,
        crate::web::routes::admin::courses::admin_lessons_update_handler,
        crate::web::routes::admin::courses::admin_lessons_delete_handler,
        crate::web::routes::admin::courses::admin_lessons_reorder_handler,
        crate::web::routes::admin::enrollments::admin_enrollments_list_handler,
        crate::web::routes::admin::enrollments::admin_enrollments_options_handler,
        crate::web::routes::admin::enrollments::admin_enrollments_create_handler,
        crate::web::routes::admin::enrollments::admin_enrollments_delete_handler,
        crate::web::routes::admin::payments::admin_payments_list_handler,
        crate::web::routes::admin::payments::admin_payments_review_handler,
    ),
    modifiers(&CookieAuthModifier),
    tags(
        (name = "auth", description = "Accounts and sessions"),
        (name = "courses", description = "Public catalog"),
        (name = "cart", description = "Cookie-backed cart"),
        (name = "orders", description = "Checkout and order history"),
        (name = "student", description = "Enrolled learning"),
        (name = "admin", description = "Back office"),
    ),
)]
pub struct ApiDoc;
