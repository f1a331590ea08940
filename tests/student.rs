mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, login_action, seed_course, seed_enrollment, seed_user, setup_server,
    setup_test_db,
};

#[tokio::test]
async fn route_student_learning_test() {
    let pool = setup_test_db().await;
    let course = seed_course(
        &pool,
        "Rust",
        99_000,
        true,
        &[("One", true), ("Two", false), ("Three", false)],
    )
    .await;
    let empty = seed_course(&pool, "Empty", 1_000, true, &[]).await;
    let locked = seed_course(&pool, "Locked", 1_000, true, &[("Secret", false)]).await;
    let student = seed_user(&pool, "Learner", "learner@test.com", "secret1", "STUDENT").await;
    seed_enrollment(&pool, student, course.id).await;
    seed_enrollment(&pool, student, empty.id).await;
    let mut server = setup_server(&pool).await;

    let learn_path = format!("/api/v1/student/courses/{}/learn", course.id);
    let (first, second, third) = (course.lessons[0], course.lessons[1], course.lessons[2]);
    let progress = |lesson_id: uuid::Uuid, is_completed: bool| {
        Action::new("progress", "POST", "/api/v1/student/progress")
            .with_body(json!({ "lesson_id": lesson_id, "is_completed": is_completed }))
    };

    Flow::new()
        .step(
            Action::new("courses_anonymous", "GET", "/api/v1/student/courses")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(login_action("learner@test.com", "secret1"))
        .step(
            Action::new("learn_default", "GET", learn_path.clone()).assert_body(move |body| {
                assert_eq!(body["current_lesson"]["id"], first.to_string());
                assert_eq!(body["youtube_id"], "video0");
                assert!(body["previous_lesson"].is_null());
                assert_eq!(body["next_lesson"]["id"], second.to_string());
                assert_eq!(body["lessons"].as_array().unwrap().len(), 3);
            }),
        )
        .step(
            Action::new("learn_selected", "GET", learn_path.clone())
                .with_param("lesson", &third.to_string())
                .assert_body(move |body| {
                    assert_eq!(body["current_lesson"]["title"], "Three");
                    assert_eq!(body["previous_lesson"]["id"], second.to_string());
                    assert!(body["next_lesson"].is_null());
                }),
        )
        .step(
            Action::new("learn_unknown_lesson", "GET", learn_path.clone())
                .with_param("lesson", &locked.lessons[0].to_string())
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("learn_not_enrolled", "GET", format!("/api/v1/student/courses/{}/learn", locked.id))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("learn_empty", "GET", format!("/api/v1/student/courses/{}/learn", empty.id))
                .assert_body(|body| {
                    assert_eq!(body["lessons"], json!([]));
                    assert!(body["current_lesson"].is_null());
                }),
        )
        .step(progress(first, true).assert_body(|body| {
            assert_eq!(body["progress"]["is_completed"], true);
            assert!(body["progress"]["completed_at"].is_string());
        }))
        .step(progress(second, true))
        // un-completing clears the timestamp
        .step(progress(second, false).assert_body(|body| {
            assert_eq!(body["progress"]["is_completed"], false);
            assert!(body["progress"]["completed_at"].is_null());
        }))
        .step(progress(locked.lessons[0], true).with_expect(StatusCode::FORBIDDEN))
        .step(progress(uuid::Uuid::new_v4(), true).with_expect(StatusCode::NOT_FOUND))
        .step(
            Action::new("my_courses", "GET", "/api/v1/student/courses").assert_body(|body| {
                let courses = body.as_array().unwrap();
                assert_eq!(courses.len(), 2);
                let rust = courses.iter().find(|c| c["title"] == "Rust").unwrap();
                assert_eq!(rust["total_lessons"], 3);
                assert_eq!(rust["completed_lessons"], 1);
                assert_eq!(rust["progress"], 33);
                let empty = courses.iter().find(|c| c["title"] == "Empty").unwrap();
                assert_eq!(empty["progress"], 0);
            }),
        )
        .step(
            Action::new("learn_with_progress", "GET", learn_path).assert_body(|body| {
                assert_eq!(body["lessons"][0]["is_completed"], true);
                assert_eq!(body["lessons"][1]["is_completed"], false);
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_student_profile_test() {
    let pool = setup_test_db().await;
    seed_user(&pool, "Learner", "learner@test.com", "secret1", "STUDENT").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_action("learner@test.com", "secret1"))
        .step(
            Action::new("profile_update", "PUT", "/api/v1/student/profile")
                .with_body(json!({ "name": "  Ploy  " }))
                .assert_body(|body| {
                    assert_eq!(body["user"]["name"], "Ploy");
                    assert_eq!(body["user"]["email"], "learner@test.com");
                }),
        )
        .step(
            Action::new("profile_blank", "PUT", "/api/v1/student/profile")
                .with_body(json!({ "name": "   " }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("password_wrong_current", "PUT", "/api/v1/student/password")
                .with_body(json!({ "current_password": "nope", "new_password": "newpass" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("password_too_short", "PUT", "/api/v1/student/password")
                .with_body(json!({ "current_password": "secret1", "new_password": "123" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("password_change", "PUT", "/api/v1/student/password")
                .with_body(json!({ "current_password": "secret1", "new_password": "newpass" })),
        )
        .step(
            login_action("learner@test.com", "secret1")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(login_action("learner@test.com", "newpass").assert_body(|body| {
            assert_eq!(body["name"], "Ploy");
        }))
        .run(&mut server, pool)
        .await;
}
