mod common;
use axum::http::StatusCode;

use crate::common::{seed_user, setup_server, setup_test_db};

#[tokio::test]
async fn page_guard_redirects_test() {
    let pool = setup_test_db().await;
    seed_user(&pool, "Student", "student@test.com", "secret1", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    let resp = server.get("/admin/payments").await;
    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    resp.assert_header("location", "/login");

    let resp = server.get("/checkout").await;
    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    resp.assert_header("location", "/login");

    server.save_cookies();
    server
        .post("/api/v1/auth/login")
        .json(&serde_json::json!({"email": "student@test.com", "password": "secret1"}))
        .await
        .assert_status_ok();

    let resp = server.get("/login").await;
    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    resp.assert_header("location", "/student/courses");

    let resp = server.get("/admin").await;
    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    resp.assert_header("location", "/");

    // a broken session cookie counts as no session on pages
    server.clear_cookies();
    let resp = server
        .get("/student/courses")
        .add_cookie(tower_cookies::Cookie::new("SID", "garbage"))
        .await;
    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    resp.assert_header("location", "/login");

    // ...but is rejected on the API
    server
        .get("/api/v1/auth/session")
        .add_cookie(tower_cookies::Cookie::new("SID", "garbage"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
