//! Publish-eligibility and draft safeguard tests

mod common;

use common::create_test_app;
use coursehub_server::CourseStore;
use serde_json::{json, Value};

/// Test: a course without lectures cannot be published
#[tokio::test]
async fn test_publish_without_lectures() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let course = app.create_course(creator.id, "Empty").await;

    let response = app
        .server
        .patch(&format!("/api/v1/courses/{}/publish?publish=true", course))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("at least one lecture"));
    assert!(!app.store.get_course(course).unwrap().unwrap().published);
}

/// Test: a lecture with neither video nor quiz blocks publishing and
/// forces an already published course back to draft
#[tokio::test]
async fn test_incomplete_lecture_forces_draft() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let (course, _, _) = app.published_course(creator.id).await;

    let module = app.add_module(creator.id, course, "Extras").await;
    app.add_module_lecture(creator.id, course, module, "Polling", None)
        .await;

    let response = app
        .server
        .patch(&format!("/api/v1/courses/{}/publish?publish=true", course))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("Polling"));
    assert!(!app.store.get_course(course).unwrap().unwrap().published);
}

/// Test: a quiz-only lecture is publishable
#[tokio::test]
async fn test_quiz_lecture_is_publishable() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let course = app.create_course(creator.id, "Quizzes").await;
    let lecture = app.add_lecture(creator.id, course, "Checkpoint", None).await;

    assert_eq!(app.publish(creator.id, course, true).await, 400);

    let response = app
        .server
        .put(&format!("/api/v1/courses/{}/lectures/{}/quiz", course, lecture))
        .json(&json!({
            "title": "Checkpoint",
            "questions": [
                { "question": "2 + 2?", "options": ["3", "4"], "correctOptionIndex": 1 }
            ]
        }))
        .add_cookie(app.auth_cookie(creator.id))
        .await;
    assert_eq!(response.status_code(), 200);

    assert_eq!(app.publish(creator.id, course, true).await, 200);
    assert!(app.store.get_course(course).unwrap().unwrap().published);
}

/// Test: unpublishing is always allowed
#[tokio::test]
async fn test_unpublish_always_allowed() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let course = app.create_course(creator.id, "Draft").await;
    app.add_lecture(creator.id, course, "Empty", None).await;

    let response = app
        .server
        .patch(&format!("/api/v1/courses/{}/publish?publish=false", course))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["published"], false);
}

/// Test: only creators toggle publishing
#[tokio::test]
async fn test_publish_requires_creator() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let other = app.create_user("Oz", "oz@example.com");
    let (course, _, _) = app.published_course(creator.id).await;

    assert_eq!(app.publish(other.id, course, false).await, 403);
    assert!(app.store.get_course(course).unwrap().unwrap().published);
}

/// Test: the eligibility report lists incomplete lectures without changing anything
#[tokio::test]
async fn test_eligibility_report() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let course = app.create_course(creator.id, "Report").await;
    app.add_lecture(creator.id, course, "Ready", Some("https://cdn.example.com/r.mp4"))
        .await;
    let missing = app.add_lecture(creator.id, course, "Missing", None).await;

    let response = app
        .server
        .get(&format!("/api/v1/courses/{}/publish-eligibility", course))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["eligible"], false);
    assert_eq!(body["totalLectures"], 2);
    let incomplete = body["incompleteLectures"].as_array().unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0]["id"], missing.to_string());
    assert_eq!(incomplete[0]["title"], "Missing");
    assert!(body["message"].is_string());
}

/// Test: a complete course reports eligible
#[tokio::test]
async fn test_eligibility_ok() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let (course, _, _) = app.published_course(creator.id).await;

    let response = app
        .server
        .get(&format!("/api/v1/courses/{}/publish-eligibility", course))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    let body: Value = response.json();
    assert_eq!(body["eligible"], true);
    assert!(body.get("message").is_none());
}

/// Test: deleting the last lecture reverts a published course to draft
#[tokio::test]
async fn test_delete_last_lecture_unpublishes() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let (course, a, b) = app.published_course(creator.id).await;

    let response = app
        .server
        .delete(&format!("/api/v1/courses/{}/lectures/{}", course, a))
        .add_cookie(app.auth_cookie(creator.id))
        .await;
    let body: Value = response.json();
    assert_eq!(body["unpublished"], false);
    assert!(app.store.get_course(course).unwrap().unwrap().published);

    let response = app
        .server
        .delete(&format!("/api/v1/courses/{}/lectures/{}", course, b))
        .add_cookie(app.auth_cookie(creator.id))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["unpublished"], true);

    let stored = app.store.get_course(course).unwrap().unwrap();
    assert!(!stored.published);
    assert!(stored.lectures.is_empty());
    assert!(app.store.get_lecture(b).unwrap().is_none());
}

/// Test: deleting a module removes its lectures and applies the same safeguard
#[tokio::test]
async fn test_delete_module_cascades() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let course = app.create_course(creator.id, "Modular").await;
    let module = app.add_module(creator.id, course, "Only").await;
    let lecture = app
        .add_module_lecture(creator.id, course, module, "Sole", Some("https://cdn.example.com/s.mp4"))
        .await;
    assert_eq!(app.publish(creator.id, course, true).await, 200);

    let response = app
        .server
        .delete(&format!("/api/v1/courses/{}/modules/{}", course, module))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["unpublished"], true);
    assert!(app.store.get_module(module).unwrap().is_none());
    assert!(app.store.get_lecture(lecture).unwrap().is_none());

    let stored = app.store.get_course(course).unwrap().unwrap();
    assert!(stored.modules.is_empty());
    assert!(!stored.published);
}

/// Test: a module belonging to another course is not found
#[tokio::test]
async fn test_delete_foreign_module() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let course = app.create_course(creator.id, "One").await;
    let other = app.create_course(creator.id, "Two").await;
    let module = app.add_module(creator.id, other, "Theirs").await;

    let response = app
        .server
        .delete(&format!("/api/v1/courses/{}/modules/{}", course, module))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 404);
    assert!(app.store.get_module(module).unwrap().is_some());
}
