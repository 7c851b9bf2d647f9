//! HTTP routes for the course service

mod announcements;
mod content;
mod courses;
mod health;
mod progress;
mod reviews;
mod views;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use coursehub_core::{Course, CourseId, UserId};
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::trace::TraceLayer;

use crate::auth::current_user;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::Store;

/// Create the router with all routes
pub fn create_router<S, N>(state: Arc<AppState<S, N>>) -> Router
where
    S: Store + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/health", get(health::health))
        // Progress ledger
        .route("/api/v1/progress/:course_id", get(progress::get_course_progress))
        .route(
            "/api/v1/progress/:course_id/lecture/:lecture_id/view",
            post(progress::view_lecture),
        )
        .route(
            "/api/v1/progress/:course_id/lecture/:lecture_id/unview",
            post(progress::unview_lecture),
        )
        .route("/api/v1/progress/:course_id/complete", post(progress::mark_completed))
        .route("/api/v1/progress/:course_id/incomplete", post(progress::mark_incomplete))
        .route("/api/v1/progress/:course_id/students", get(progress::list_students))
        // Courses
        .route(
            "/api/v1/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/api/v1/courses/:course_id",
            get(courses::get_course)
                .patch(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/api/v1/courses/:course_id/publish", patch(courses::set_published))
        .route(
            "/api/v1/courses/:course_id/publish-eligibility",
            get(courses::publish_eligibility),
        )
        // Content
        .route("/api/v1/courses/:course_id/modules", post(content::create_module))
        .route(
            "/api/v1/courses/:course_id/modules/:module_id",
            delete(content::delete_module),
        )
        .route("/api/v1/courses/:course_id/lectures", post(content::create_lecture))
        .route(
            "/api/v1/courses/:course_id/modules/:module_id/lectures",
            post(content::create_module_lecture),
        )
        .route(
            "/api/v1/courses/:course_id/lectures/:lecture_id",
            patch(content::update_lecture).delete(content::delete_lecture),
        )
        .route(
            "/api/v1/courses/:course_id/lectures/:lecture_id/quiz",
            put(content::set_quiz).delete(content::remove_quiz),
        )
        // Reviews and announcements
        .route(
            "/api/v1/courses/:course_id/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/api/v1/courses/:course_id/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load a course the caller is a creator of
pub(crate) fn creator_course<S: Store>(
    store: &S,
    course_id: CourseId,
    user: UserId,
) -> Result<Course, ApiError> {
    let course = store.get_course(course_id)?.ok_or(ApiError::CourseNotFound)?;
    if !course.is_creator(user) {
        tracing::debug!(course = %course_id, user = %user, "Rejected non-creator");
        return Err(ApiError::Forbidden);
    }
    Ok(course)
}

/// Load a course for public display.
///
/// Drafts are only visible to their creators; everyone else gets a 404.
/// Returns whether the caller is a creator.
pub(crate) fn visible_course<S: Store, N: Notifier>(
    state: &AppState<S, N>,
    cookies: &Cookies,
    course_id: CourseId,
) -> Result<(Course, bool), ApiError> {
    let course = state
        .store
        .get_course(course_id)?
        .ok_or(ApiError::CourseNotFound)?;

    let viewer = current_user(cookies, &state.tokens).ok();
    let is_creator = viewer.is_some_and(|user| course.is_creator(user));
    if !course.published && !is_creator {
        return Err(ApiError::CourseNotFound);
    }
    Ok((course, is_creator))
}
