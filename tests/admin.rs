mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, login_action, login_admin_action, seed_course, seed_user, setup_server,
    setup_test_db,
};

fn course_path(ctx: &common::FlowContext) -> String {
    format!("/api/v1/admin/courses/{}", ctx.get("course")["id"].as_str().unwrap())
}

#[tokio::test]
async fn route_admin_requires_admin_test() {
    let pool = setup_test_db().await;
    seed_user(&pool, "Student", "student@test.com", "secret1", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(Action::new("stats_anonymous", "GET", "/api/v1/admin/stats").with_expect(StatusCode::UNAUTHORIZED))
        .step(login_action("student@test.com", "secret1"))
        .step(Action::new("stats_student", "GET", "/api/v1/admin/stats").with_expect(StatusCode::FORBIDDEN))
        .step(Action::new("users_student", "GET", "/api/v1/admin/users").with_expect(StatusCode::FORBIDDEN))
        .step(login_admin_action())
        .step(Action::new("stats_admin", "GET", "/api/v1/admin/stats").assert_body(|body| {
            assert_eq!(body["total_users"], 2);
            assert_eq!(body["total_courses"], 0);
            assert_eq!(body["pending_orders"], 0);
            assert_eq!(body["total_revenue"], 0.0);
            assert_eq!(body["recent_orders"], json!([]));
        }))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_admin_courses_test() {
    let pool = setup_test_db().await;
    let other = seed_course(&pool, "Other", 1_000, true, &[("Foreign", false)]).await;
    let mut server = setup_server(&pool).await;
    let foreign_lesson = other.lessons[0];

    Flow::new()
        .step(login_admin_action())
        .step(
            Action::new("course_create_invalid", "POST", "/api/v1/admin/courses")
                .with_body(json!({ "title": "" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("course_create_overpriced", "POST", "/api/v1/admin/courses")
                .with_body(json!({ "title": "Huge", "price": 1e17 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("course_create", "POST", "/api/v1/admin/courses")
                .with_body(json!({ "title": "Rust  for Web!", "description": "Axum", "price": 1290 }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("course")
                .assert_body(|body| {
                    let slug = body["slug"].as_str().unwrap();
                    assert!(slug.starts_with("rust-for-web-"), "{slug}");
                    assert_eq!(body["price"], 1290.0);
                    assert_eq!(body["is_published"], false);
                }),
        )
        .step(
            Action::new("lesson_create_invalid", "POST", "dynamic")
                .with_dyn_path(|ctx| format!("{}/lessons", course_path(ctx)))
                .with_body(json!({ "title": "No video", "video_url": "" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("lesson_create_first", "POST", "dynamic")
                .with_dyn_path(|ctx| format!("{}/lessons", course_path(ctx)))
                .with_body(json!({ "title": "Setup", "video_url": "https://youtu.be/a", "is_free": true }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("lesson_a")
                .assert_body(|body| assert_eq!(body["position"], 0)),
        )
        .step(
            Action::new("lesson_create_second", "POST", "dynamic")
                .with_dyn_path(|ctx| format!("{}/lessons", course_path(ctx)))
                .with_body(json!({ "title": "Routing", "video_url": "https://youtu.be/b" }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("lesson_b")
                .assert_body(|body| assert_eq!(body["position"], 1)),
        )
        .step(
            Action::new("lessons_reorder", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("{}/lessons/reorder", course_path(ctx)))
                .with_dyn_body(move |ctx| {
                    json!({ "lessons": [
                        { "id": ctx.get("lesson_a")["id"], "position": 1 },
                        { "id": ctx.get("lesson_b")["id"], "position": 0 },
                        { "id": foreign_lesson, "position": 9 },
                    ]})
                }),
        )
        .step(
            Action::new("course_get", "GET", "dynamic")
                .with_dyn_path(course_path)
                .assert_body(|body| {
                    let lessons = body["lessons"].as_array().unwrap();
                    assert_eq!(lessons.len(), 2);
                    assert_eq!(lessons[0]["title"], "Routing");
                    assert_eq!(lessons[1]["title"], "Setup");
                }),
        )
        .step(
            Action::new("lesson_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| {
                    format!(
                        "{}/lessons/{}",
                        course_path(ctx),
                        ctx.get("lesson_a")["id"].as_str().unwrap()
                    )
                })
                .with_body(json!({ "title": "Project setup" }))
                .assert_body(|body| {
                    assert_eq!(body["title"], "Project setup");
                    assert_eq!(body["video_url"], "https://youtu.be/a");
                    assert_eq!(body["is_free"], true);
                }),
        )
        // lessons of other courses are out of reach
        .step(
            Action::new("lesson_update_foreign", "PUT", "dynamic")
                .with_dyn_path(move |ctx| format!("{}/lessons/{}", course_path(ctx), foreign_lesson))
                .with_body(json!({ "title": "Hijacked" }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("course_update", "PUT", "dynamic")
                .with_dyn_path(course_path)
                .with_body(json!({ "is_published": true, "price": 990.5 }))
                .assert_body(|body| {
                    assert_eq!(body["is_published"], true);
                    assert_eq!(body["price"], 990.5);
                    assert_eq!(body["title"], "Rust  for Web!");
                }),
        )
        .step(
            Action::new("courses_list", "GET", "/api/v1/admin/courses").assert_body(|body| {
                assert_eq!(body["total"], 2);
                let items = body["items"].as_array().unwrap();
                assert_eq!(items[0]["lessons_count"], 2);
            }),
        )
        .step(
            Action::new("lesson_delete", "DELETE", "dynamic").with_dyn_path(|ctx| {
                format!(
                    "{}/lessons/{}",
                    course_path(ctx),
                    ctx.get("lesson_b")["id"].as_str().unwrap()
                )
            }),
        )
        .step(Action::new("course_delete", "DELETE", "dynamic").with_dyn_path(course_path))
        .step(
            Action::new("course_get_deleted", "GET", "dynamic")
                .with_dyn_path(course_path)
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("course_update_unknown", "PUT", format!("/api/v1/admin/courses/{}", uuid::Uuid::new_v4()))
                .with_body(json!({ "title": "Ghost" }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_admin_users_and_enrollments_test() {
    let pool = setup_test_db().await;
    let course = seed_course(&pool, "Rust", 99_000, true, &[]).await;
    let mut server = setup_server(&pool).await;
    let course_id = course.id;

    Flow::new()
        .step(login_admin_action())
        .step(
            Action::new("user_create", "POST", "/api/v1/admin/users")
                .with_body(json!({
                    "name": "Teacher Pim",
                    "email": "pim@test.com",
                    "password": "secret1",
                    "role": "ADMIN",
                }))
                .with_expect(StatusCode::CREATED)
                .assert_body(|body| assert_eq!(body["role"], "ADMIN")),
        )
        .step(
            Action::new("user_create_student", "POST", "/api/v1/admin/users")
                .with_body(json!({
                    "name": "Student Ton",
                    "email": "ton@test.com",
                    "password": "secret1",
                }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("student")
                .assert_body(|body| assert_eq!(body["role"], "STUDENT")),
        )
        .step(
            Action::new("user_create_duplicate", "POST", "/api/v1/admin/users")
                .with_body(json!({
                    "name": "Student Ton",
                    "email": "ton@test.com",
                    "password": "secret1",
                }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(Action::new("users_list", "GET", "/api/v1/admin/users").assert_body(|body| {
            assert_eq!(body["total"], 3);
            assert_eq!(body["items"].as_array().unwrap().len(), 3);
        }))
        .step(
            Action::new("enrollment_options", "GET", "/api/v1/admin/enrollments/options")
                .assert_body(|body| {
                    assert_eq!(body["students"].as_array().unwrap().len(), 1);
                    assert_eq!(body["courses"].as_array().unwrap().len(), 1);
                }),
        )
        .step(
            Action::new("enrollment_create", "POST", "/api/v1/admin/enrollments")
                .with_dyn_body(move |ctx| {
                    json!({ "user_id": ctx.get("student")["id"], "course_id": course_id })
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("enrollment"),
        )
        .step(
            Action::new("enrollment_create_duplicate", "POST", "/api/v1/admin/enrollments")
                .with_dyn_body(move |ctx| {
                    json!({ "user_id": ctx.get("student")["id"], "course_id": course_id })
                })
                .with_expect(StatusCode::CONFLICT),
        )
        .step(Action::new("enrollments_list", "GET", "/api/v1/admin/enrollments").assert_body(|body| {
            let rows = body.as_array().unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["user_email"], "ton@test.com");
            assert_eq!(rows[0]["course_title"], "Rust");
        }))
        .step(Action::new("enrollment_delete", "DELETE", "dynamic").with_dyn_path(|ctx| {
            format!("/api/v1/admin/enrollments/{}", ctx.get("enrollment")["id"].as_str().unwrap())
        }))
        .step(
            Action::new("enrollment_delete_again", "DELETE", "dynamic")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/enrollments/{}", ctx.get("enrollment")["id"].as_str().unwrap())
                })
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
