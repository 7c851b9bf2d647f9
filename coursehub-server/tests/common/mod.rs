//! Common test utilities for course service integration tests

#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum_test::TestServer;
use chrono::Duration;
use coursehub_core::{Announcement, CourseId, LectureId, ModuleId, User, UserId};
use coursehub_server::auth::TOKEN_COOKIE;
use coursehub_server::{routes, AppState, InMemoryStore, Notifier, Store, TokenKeys};
use serde_json::{json, Value};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// A sent announcement notice
#[derive(Debug, Clone)]
pub struct SentNotice {
    pub email: String,
    pub course_title: String,
    pub title: String,
}

/// Mock notifier that captures announcement notices
#[derive(Default, Clone)]
pub struct MockNotifier {
    pub sent: Arc<RwLock<Vec<SentNotice>>>,
    /// Addresses that fail delivery
    pub failing: Arc<RwLock<Vec<String>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, email: &str) {
        self.failing.write().unwrap().push(email.to_string());
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .map(|n| n.email.clone())
            .collect()
    }
}

impl Notifier for MockNotifier {
    fn send_announcement(
        &self,
        email: &str,
        course_title: &str,
        announcement: &Announcement,
    ) -> Result<(), String> {
        if self.failing.read().unwrap().iter().any(|e| e == email) {
            return Err(format!("mailbox unavailable: {}", email));
        }
        self.sent.write().unwrap().push(SentNotice {
            email: email.to_string(),
            course_title: course_title.to_string(),
            title: announcement.title.clone(),
        });
        Ok(())
    }
}

/// A running test server with handles to its store and notifier
pub struct TestApp<S: Store = InMemoryStore> {
    pub server: TestServer,
    pub store: Arc<S>,
    pub notifier: MockNotifier,
    pub tokens: TokenKeys,
}

/// Create a test server backed by the in-memory store
pub fn create_test_app() -> TestApp {
    create_test_app_with(InMemoryStore::new())
}

/// Create a test server backed by the given store
pub fn create_test_app_with<S: Store + 'static>(store: S) -> TestApp<S> {
    let notifier = MockNotifier::new();
    let tokens = TokenKeys::from_secret(TEST_SECRET);

    let state = Arc::new(AppState::new(
        store,
        notifier.clone(),
        tokens.clone(),
        Duration::seconds(300),
    ));
    let store = state.store.clone();

    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        store,
        notifier,
        tokens,
    }
}

/// Parse an id field out of a JSON response
pub fn id_of<T: std::str::FromStr>(value: &Value) -> T
where
    T::Err: std::fmt::Debug,
{
    value
        .as_str()
        .expect("id should be a string")
        .parse()
        .expect("id should parse")
}

impl<S: Store> TestApp<S> {
    /// Register a user the way the auth service would
    pub fn create_user(&self, name: &str, email: &str) -> User {
        let user = User::new(name, email);
        self.store.insert_user(&user).unwrap();
        user
    }

    /// Token cookie for a user
    pub fn auth_cookie(&self, user: UserId) -> cookie::Cookie<'static> {
        let token = self.tokens.issue(user, Duration::hours(1)).unwrap();
        cookie::Cookie::new(TOKEN_COOKIE, token)
    }

    pub async fn create_course(&self, creator: UserId, title: &str) -> CourseId {
        let response = self
            .server
            .post("/api/v1/courses")
            .json(&json!({
                "title": title,
                "category": "Programming",
                "level": "beginner",
                "price": 1999,
            }))
            .add_cookie(self.auth_cookie(creator))
            .await;
        assert_eq!(response.status_code(), 200);
        id_of(&response.json::<Value>()["course"]["id"])
    }

    /// Add a lecture directly to a course
    pub async fn add_lecture(
        &self,
        creator: UserId,
        course: CourseId,
        title: &str,
        video_url: Option<&str>,
    ) -> LectureId {
        let response = self
            .server
            .post(&format!("/api/v1/courses/{}/lectures", course))
            .json(&json!({ "title": title, "videoUrl": video_url, "duration": 300 }))
            .add_cookie(self.auth_cookie(creator))
            .await;
        assert_eq!(response.status_code(), 200);
        id_of(&response.json::<Value>()["lecture"]["id"])
    }

    pub async fn add_module(&self, creator: UserId, course: CourseId, title: &str) -> ModuleId {
        let response = self
            .server
            .post(&format!("/api/v1/courses/{}/modules", course))
            .json(&json!({ "title": title }))
            .add_cookie(self.auth_cookie(creator))
            .await;
        assert_eq!(response.status_code(), 200);
        id_of(&response.json::<Value>()["module"]["id"])
    }

    pub async fn add_module_lecture(
        &self,
        creator: UserId,
        course: CourseId,
        module: ModuleId,
        title: &str,
        video_url: Option<&str>,
    ) -> LectureId {
        let response = self
            .server
            .post(&format!("/api/v1/courses/{}/modules/{}/lectures", course, module))
            .json(&json!({ "title": title, "videoUrl": video_url, "duration": 120 }))
            .add_cookie(self.auth_cookie(creator))
            .await;
        assert_eq!(response.status_code(), 200);
        id_of(&response.json::<Value>()["lecture"]["id"])
    }

    pub async fn publish(&self, creator: UserId, course: CourseId, publish: bool) -> u16 {
        self.server
            .patch(&format!("/api/v1/courses/{}/publish?publish={}", course, publish))
            .add_cookie(self.auth_cookie(creator))
            .await
            .status_code()
            .as_u16()
    }

    /// A course with two video lectures, published
    pub async fn published_course(&self, creator: UserId) -> (CourseId, LectureId, LectureId) {
        let course = self.create_course(creator, "Rust in Practice").await;
        let a = self
            .add_lecture(creator, course, "Ownership", Some("https://cdn.example.com/a.mp4"))
            .await;
        let b = self
            .add_lecture(creator, course, "Borrowing", Some("https://cdn.example.com/b.mp4"))
            .await;
        assert_eq!(self.publish(creator, course, true).await, 200);
        (course, a, b)
    }

    pub async fn view(&self, user: UserId, course: CourseId, lecture: LectureId) -> Value {
        let response = self
            .server
            .post(&format!("/api/v1/progress/{}/lecture/{}/view", course, lecture))
            .add_cookie(self.auth_cookie(user))
            .await;
        assert_eq!(response.status_code(), 200);
        response.json()
    }

    pub async fn unview(&self, user: UserId, course: CourseId, lecture: LectureId) -> Value {
        let response = self
            .server
            .post(&format!("/api/v1/progress/{}/lecture/{}/unview", course, lecture))
            .add_cookie(self.auth_cookie(user))
            .await;
        assert_eq!(response.status_code(), 200);
        response.json()
    }
}
