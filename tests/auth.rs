mod common;
use axum::http::StatusCode;
use learnhub::web::middlewares::AUTH_TOKEN;
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, login_action, register_action, seed_user, setup_server, setup_test_db,
};

#[tokio::test]
async fn route_register_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            register_action("Somchai", "somchai@test.com", "secret1")
                .with_expect(StatusCode::CREATED)
                .assert_body(|body| {
                    assert_eq!(body["message"], "Registration successful.");
                    assert!(body["user_id"].is_string());
                }),
        )
        // same email twice
        .step(
            register_action("Somchai", "somchai@test.com", "secret1")
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("register_mismatch", "POST", "/api/v1/auth/register")
                .with_body(json!({
                    "name": "Nok",
                    "email": "nok@test.com",
                    "password": "secret1",
                    "confirm_password": "secret2",
                }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    let message = body["message"].as_str().unwrap();
                    assert!(message.contains("Passwords do not match"), "{message}");
                }),
        )
        .step(
            register_action("N", "not-an-email", "123")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_login_test() {
    let pool = setup_test_db().await;
    seed_user(&pool, "Student", "student@test.com", "student123", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            login_action("student@test.com", "student123")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    assert_eq!(body["email"], "student@test.com");
                    assert_eq!(body["role"], "STUDENT");
                }),
        )
        .step(
            Action::new("session", "GET", "/api/v1/auth/session")
                .assert_body(|body| assert_eq!(body["name"], "Student")),
        )
        .step(Action::new("logout", "POST", "/api/v1/auth/logout"))
        .step(
            Action::new("session_after_logout", "GET", "/api/v1/auth/session")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // wrong password
        .step(
            login_action("student@test.com", "wrong-password")
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // unknown account
        .step(
            login_action("nobody@test.com", "student123")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_reset_password_test() {
    let pool = setup_test_db().await;
    seed_user(&pool, "Forgetful", "forgetful@test.com", "oldpass", "STUDENT").await;
    sqlx::query(
        "INSERT INTO password_reset_tokens (id, email, token, expires) VALUES ($1,$2,$3, now() + interval '1 hour'), ($4,$2,$5, now() - interval '1 minute')",
    )
    .bind(uuid::Uuid::new_v4())
    .bind("forgetful@test.com")
    .bind("valid-token")
    .bind(uuid::Uuid::new_v4())
    .bind("stale-token")
    .execute(pool.pool())
    .await
    .unwrap();
    let mut server = setup_server(&pool).await;

    let reset = |token: &str| {
        Action::new("reset_password", "POST", "/api/v1/auth/reset-password").with_body(json!({
            "token": token,
            "password": "newpass",
            "confirm_password": "newpass",
        }))
    };

    Flow::new()
        .step(reset("stale-token").with_expect(StatusCode::BAD_REQUEST))
        .step(reset("unknown-token").with_expect(StatusCode::BAD_REQUEST))
        .step(
            Action::new("reset_without_token", "POST", "/api/v1/auth/reset-password")
                .with_body(json!({"password": "newpass", "confirm_password": "newpass"}))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(reset("valid-token"))
        // tokens are single use
        .step(reset("valid-token").with_expect(StatusCode::BAD_REQUEST))
        .step(login_action("forgetful@test.com", "oldpass").with_expect(StatusCode::UNAUTHORIZED))
        .step(login_action("forgetful@test.com", "newpass"))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_forgot_password_test() {
    let pool = setup_test_db().await;
    seed_user(&pool, "Known", "known@test.com", "secret1", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    let forgot = |email: &str| {
        Action::new("forgot_password", "POST", "/api/v1/auth/forgot-password")
            .with_body(json!({ "email": email }))
    };

    Flow::new()
        .step(forgot("known@test.com"))
        .step(forgot("known@test.com").assert_body(|body| {
            assert_eq!(
                body["message"],
                "If this email is registered, a password reset link has been sent."
            );
        }))
        // unknown emails get the very same answer
        .step(forgot("unknown@test.com").assert_body(|body| {
            assert_eq!(
                body["message"],
                "If this email is registered, a password reset link has been sent."
            );
        }))
        .step(forgot("not-an-email").with_expect(StatusCode::BAD_REQUEST))
        .run(&mut server, pool)
        .await;
}
