//! Course announcement endpoints

use std::sync::Arc;

use axum::extract::State;
use coursehub_core::{Announcement, Course, CourseId};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::auth::current_user;
use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::Store;

#[derive(Serialize)]
pub struct AnnouncementsResponse {
    pub success: bool,
    pub announcements: Vec<Announcement>,
}

/// GET /api/v1/courses/:course_id/announcements
pub async fn list_announcements<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<AnnouncementsResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let (course, _) = super::visible_course(&*state, &cookies, course_id)?;

    let mut announcements = course.announcements;
    announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(AnnouncementsResponse {
        success: true,
        announcements,
    }))
}

#[derive(Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct AnnouncementResponse {
    pub success: bool,
    pub announcement: Announcement,
    /// Students a notice was handed to
    pub notified: usize,
}

/// POST /api/v1/courses/:course_id/announcements
pub async fn create_announcement<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<Json<AnnouncementResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    super::creator_course(store, course_id, user)?;

    let (title, message) = (req.title.trim(), req.message.trim());
    if title.is_empty() || message.is_empty() {
        return Err(ApiError::Validation(
            "Title and message are required".to_string(),
        ));
    }

    let announcement = Announcement::new(user, title, message);
    let course = store.modify_course(course_id, &mut |c| {
        c.announcements.push(announcement.clone())
    })?;
    tracing::info!(course = %course_id, announcement = %announcement.id, "Announcement posted");

    let notified = notify_students(&*state, &course, &announcement);

    Ok(Json(AnnouncementResponse {
        success: true,
        announcement,
        notified,
    }))
}

/// Send a notice to every enrolled student with a known address. Failures
/// are logged and skipped.
fn notify_students<S: Store, N: Notifier>(
    state: &AppState<S, N>,
    course: &Course,
    announcement: &Announcement,
) -> usize {
    let mut sent = 0;
    for record in &course.enrollments {
        let user = match state.store.get_user(record.student) {
            Ok(Some(user)) if !user.email.is_empty() => user,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(student = %record.student, error = %e, "Failed to load student");
                continue;
            }
        };

        match state
            .notifier
            .send_announcement(&user.email, &course.title, announcement)
        {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!(email = %user.email, error = %e, "Failed to send announcement"),
        }
    }
    sent
}
