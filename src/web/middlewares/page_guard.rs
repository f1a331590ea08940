use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::web::{AppState, UserRole, middlewares::resolve_user};

const AUTH_PAGES: [&str; 3] = ["/login", "/register", "/forgot-password"];
const PUBLIC_PAGES: [&str; 4] = ["/", "/courses", "/about", "/contact"];
const STATIC_EXTENSIONS: [&str; 22] = [
    "html", "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff",
    "woff2", "ico", "csv", "doc", "docx", "xls", "xlsx", "zip", "webmanifest", "map",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDecision {
    Allow,
    Redirect(&'static str),
}

pub fn decide(path: &str, role: Option<&UserRole>) -> PageDecision {
    if path.starts_with("/api") || is_static_asset(path) {
        return PageDecision::Allow;
    }

    let is_auth_page = AUTH_PAGES.iter().any(|p| path.starts_with(p));
    if is_auth_page {
        return match role {
            Some(UserRole::Admin) => PageDecision::Redirect("/admin"),
            Some(UserRole::Student) => PageDecision::Redirect("/student/courses"),
            None => PageDecision::Allow,
        };
    }

    let is_public = PUBLIC_PAGES.contains(&path) || path.starts_with("/courses/");
    if is_public {
        return PageDecision::Allow;
    }

    if path.starts_with("/admin") {
        return match role {
            None => PageDecision::Redirect("/login"),
            Some(UserRole::Admin) => PageDecision::Allow,
            Some(_) => PageDecision::Redirect("/"),
        };
    }

    let needs_login = ["/student", "/cart", "/checkout"]
        .iter()
        .any(|p| path.starts_with(p));
    if needs_login && role.is_none() {
        return PageDecision::Redirect("/login");
    }

    PageDecision::Allow
}

fn is_static_asset(path: &str) -> bool {
    if path.starts_with("/_next") {
        return true;
    }

    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((_, ext)) => STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

pub async fn page_guard_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request,
    next: Next,
) -> Response {
    // a broken session cookie on a page request is treated as no session
    let role = match resolve_user(&state, &cookies).await {
        Ok(user) => user.map(|u| u.user_role()),
        Err(e) => {
            tracing::debug!("page request with unusable session: {e}");
            None
        }
    };

    match decide(req.uri().path(), role.as_ref()) {
        PageDecision::Allow => next.run(req).await,
        PageDecision::Redirect(to) => Redirect::temporary(to).into_response(),
    }
}
