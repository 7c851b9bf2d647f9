//! Announcement tests

mod common;

use common::create_test_app;
use coursehub_core::UserId;
use serde_json::{json, Value};

/// Test: enrolled students with a known address are notified
#[tokio::test]
async fn test_announcement_notifies_students() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let sam = app.create_user("Sam", "sam@example.com");
    let kim = app.create_user("Kim", "kim@example.com");
    let (course, a, _) = app.published_course(creator.id).await;

    app.view(sam.id, course, a).await;
    app.view(kim.id, course, a).await;
    // Enrolled but unknown to the user store
    app.view(UserId::new(), course, a).await;

    let response = app
        .server
        .post(&format!("/api/v1/courses/{}/announcements", course))
        .json(&json!({ "title": "Office hours", "message": "Friday at 3pm" }))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["notified"], 2);
    assert_eq!(body["announcement"]["title"], "Office hours");

    let mut sent = app.notifier.sent_to();
    sent.sort();
    assert_eq!(sent, vec!["kim@example.com", "sam@example.com"]);

    let notices = app.notifier.sent.read().unwrap();
    assert!(notices.iter().all(|n| n.course_title == "Rust in Practice"));
    assert!(notices.iter().all(|n| n.title == "Office hours"));
}

/// Test: a failed delivery does not fail the post
#[tokio::test]
async fn test_notifier_failure_is_ignored() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let sam = app.create_user("Sam", "sam@example.com");
    let kim = app.create_user("Kim", "kim@example.com");
    let (course, a, _) = app.published_course(creator.id).await;
    app.view(sam.id, course, a).await;
    app.view(kim.id, course, a).await;

    app.notifier.fail_for("sam@example.com");

    let response = app
        .server
        .post(&format!("/api/v1/courses/{}/announcements", course))
        .json(&json!({ "title": "Moved", "message": "New room" }))
        .add_cookie(app.auth_cookie(creator.id))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["notified"], 1);
    assert_eq!(app.notifier.sent_to(), vec!["kim@example.com"]);
}

/// Test: only creators post, and both fields are required
#[tokio::test]
async fn test_announcement_rules() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let student = app.create_user("Sam", "sam@example.com");
    let (course, _, _) = app.published_course(creator.id).await;

    let response = app
        .server
        .post(&format!("/api/v1/courses/{}/announcements", course))
        .json(&json!({ "title": "Hi", "message": "From a student" }))
        .add_cookie(app.auth_cookie(student.id))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .server
        .post(&format!("/api/v1/courses/{}/announcements", course))
        .json(&json!({ "title": "Hi", "message": "   " }))
        .add_cookie(app.auth_cookie(creator.id))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Test: announcements list newest first
#[tokio::test]
async fn test_list_announcements() {
    let app = create_test_app();
    let creator = app.create_user("Ina", "ina@example.com");
    let (course, _, _) = app.published_course(creator.id).await;

    for title in ["First", "Second"] {
        let response = app
            .server
            .post(&format!("/api/v1/courses/{}/announcements", course))
            .json(&json!({ "title": title, "message": "body" }))
            .add_cookie(app.auth_cookie(creator.id))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = app
        .server
        .get(&format!("/api/v1/courses/{}/announcements", course))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let announcements = body["announcements"].as_array().unwrap();
    assert_eq!(announcements.len(), 2);
    assert_eq!(announcements[0]["title"], "Second");
    assert_eq!(announcements[1]["title"], "First");
}
