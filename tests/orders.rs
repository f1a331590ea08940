mod common;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::json;

use crate::common::{
    Action, Flow, login_action, login_admin_action, seed_course, seed_enrollment, seed_user,
    setup_server, setup_test_db,
};

fn slip_form() -> MultipartForm {
    let slip = Part::bytes(vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4])
        .file_name("slip.png")
        .mime_type("image/png");
    MultipartForm::new().add_part("slip", slip)
}

fn checkout() -> Action {
    Action::new("checkout", "POST", "/api/v1/orders").with_multipart(slip_form())
}

fn add_to_cart(course_id: uuid::Uuid) -> Action {
    Action::new("cart_add", "POST", "/api/v1/cart").with_body(json!({ "course_id": course_id }))
}

fn review(action: &'static str) -> Action {
    Action::new("review", "PUT", "dynamic")
        .with_dyn_path(|ctx| {
            format!(
                "/api/v1/admin/payments/{}",
                ctx.get("order")["order"]["id"].as_str().unwrap()
            )
        })
        .with_body(json!({ "action": action, "reason": "Blurry slip" }))
}

#[tokio::test]
async fn route_checkout_and_approve_test() {
    let pool = setup_test_db().await;
    let rust = seed_course(&pool, "Rust", 99_000, true, &[("Intro", true)]).await;
    let go = seed_course(&pool, "Go", 50_050, true, &[]).await;
    seed_user(&pool, "Buyer", "buyer@test.com", "secret1", "STUDENT").await;
    seed_user(&pool, "Other", "other@test.com", "secret1", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(checkout().with_expect(StatusCode::UNAUTHORIZED))
        .step(login_action("buyer@test.com", "secret1"))
        .step(
            Action::new("checkout_without_slip", "POST", "/api/v1/orders")
                .with_multipart(MultipartForm::new().add_text("note", "no slip"))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert_eq!(body["code"], "MISSING_SLIP")),
        )
        .step(
            checkout()
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert_eq!(body["code"], "EMPTY_CART")),
        )
        .step(add_to_cart(rust.id))
        .step(add_to_cart(go.id))
        .step(
            Action::new("checkout_html_slip", "POST", "/api/v1/orders")
                .with_multipart(MultipartForm::new().add_part(
                    "slip",
                    Part::bytes(b"<script>alert(1)</script>".to_vec())
                        .file_name("x.html")
                        .mime_type("text/html"),
                ))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert_eq!(body["code"], "INVALID_SLIP")),
        )
        .step(
            checkout()
                .with_expect(StatusCode::CREATED)
                .with_save_as("order")
                .assert_body(|body| {
                    let order = &body["order"];
                    assert_eq!(order["status"], "PENDING");
                    assert_eq!(order["total_amount"], 1490.5);
                    assert_eq!(order["items"].as_array().unwrap().len(), 2);
                    let slip_url = order["slip_url"].as_str().unwrap();
                    assert!(slip_url.starts_with("/uploads/slips/"), "{slip_url}");
                    assert!(slip_url.ends_with(".png"), "{slip_url}");
                }),
        )
        // the cart is emptied by checkout
        .step(Action::new("cart_after_checkout", "GET", "/api/v1/cart").assert_body(|body| {
            assert_eq!(body["items"], json!([]));
        }))
        .step(Action::new("orders_list", "GET", "/api/v1/orders").assert_body(|body| {
            let orders = body["orders"].as_array().unwrap();
            assert_eq!(orders.len(), 1);
            assert_eq!(orders[0]["items"][0]["course_title"], "Go");
        }))
        .step(Action::new("order_get", "GET", "dynamic").with_dyn_path(|ctx| {
            format!("/api/v1/orders/{}", ctx.get("order")["order"]["id"].as_str().unwrap())
        }))
        // only the buyer and admins see an order
        .step(login_action("other@test.com", "secret1").with_clear_cookies(true))
        .step(
            Action::new("order_get_foreign", "GET", "dynamic")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/orders/{}", ctx.get("order")["order"]["id"].as_str().unwrap())
                })
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(review("approve").with_expect(StatusCode::FORBIDDEN))
        .step(login_admin_action())
        .step(
            Action::new("payments_pending", "GET", "/api/v1/admin/payments")
                .with_param("status", "PENDING")
                .assert_body(|body| {
                    let orders = body.as_array().unwrap();
                    assert_eq!(orders.len(), 1);
                    assert_eq!(orders[0]["user_email"], "buyer@test.com");
                    assert_eq!(orders[0]["items"].as_array().unwrap().len(), 2);
                }),
        )
        .step(
            Action::new(
                "review_unknown_order",
                "PUT",
                format!("/api/v1/admin/payments/{}", uuid::Uuid::new_v4()),
            )
                .with_body(json!({ "action": "maybe" }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(review("maybe").with_expect(StatusCode::BAD_REQUEST))
        .step(review("approve").assert_body(|body| {
            assert_eq!(body["success"], true);
            assert_eq!(body["status"], "APPROVED");
        }))
        .step(
            review("reject")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert_eq!(body["code"], "ORDER_NOT_PENDING")),
        )
        .step(
            Action::new("payments_approved", "GET", "/api/v1/admin/payments")
                .with_param("status", "APPROVED")
                .assert_body(|body| {
                    assert_eq!(body[0]["approver_name"], "Admin User");
                    assert!(body[0]["approved_at"].is_string());
                }),
        )
        // approval enrolled the buyer in both courses
        .step(login_action("buyer@test.com", "secret1").with_clear_cookies(true))
        .step(
            Action::new("student_courses", "GET", "/api/v1/student/courses").assert_body(|body| {
                assert_eq!(body.as_array().unwrap().len(), 2);
            }),
        )
        .step(
            add_to_cart(rust.id)
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| assert_eq!(body["code"], "ALREADY_ENROLLED")),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_checkout_refusals_test() {
    let pool = setup_test_db().await;
    let draft = seed_course(&pool, "Draft", 10_000, true, &[]).await;
    let owned = seed_course(&pool, "Owned", 20_000, true, &[]).await;
    let buyer = seed_user(&pool, "Buyer", "buyer@test.com", "secret1", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    let db = pool.pool().clone();

    server.save_cookies();
    server
        .post("/api/v1/auth/login")
        .json(&json!({"email": "buyer@test.com", "password": "secret1"}))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/cart")
        .json(&json!({"course_id": draft.id}))
        .await
        .assert_status_ok();

    // unpublished after it went into the cart
    sqlx::query("UPDATE courses SET is_published = false WHERE id = $1")
        .bind(draft.id)
        .execute(&db)
        .await
        .unwrap();
    let resp = server.post("/api/v1/orders").multipart(slip_form()).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<serde_json::Value>()["code"], "NOTHING_PURCHASABLE");

    server
        .post("/api/v1/cart")
        .json(&json!({"course_id": owned.id}))
        .await
        .assert_status_ok();
    seed_enrollment(&pool, buyer, owned.id).await;
    let resp = server.post("/api/v1/orders").multipart(slip_form()).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<serde_json::Value>()["code"], "COURSES_OWNED");
}

#[tokio::test]
async fn route_reject_order_test() {
    let pool = setup_test_db().await;
    let rust = seed_course(&pool, "Rust", 99_000, true, &[]).await;
    seed_user(&pool, "Buyer", "buyer@test.com", "secret1", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_action("buyer@test.com", "secret1"))
        .step(add_to_cart(rust.id))
        .step(checkout().with_expect(StatusCode::CREATED).with_save_as("order"))
        .step(login_admin_action())
        .step(review("reject").assert_body(|body| assert_eq!(body["status"], "REJECTED")))
        .step(
            Action::new("payments_rejected", "GET", "/api/v1/admin/payments")
                .with_param("status", "REJECTED")
                .assert_body(|body| assert_eq!(body[0]["rejection_reason"], "Blurry slip")),
        )
        .step(review("approve").with_expect(StatusCode::BAD_REQUEST))
        .step(login_action("buyer@test.com", "secret1").with_clear_cookies(true))
        .step(
            Action::new("student_courses", "GET", "/api/v1/student/courses")
                .assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 0)),
        )
        .run(&mut server, pool)
        .await;
}
