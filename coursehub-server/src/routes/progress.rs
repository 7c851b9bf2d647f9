//! Progress ledger endpoints

use std::sync::Arc;

use axum::extract::State;
use chrono::{DateTime, Utc};
use coursehub_core::{CourseId, LectureId, ProgressSummary, UserId};
use serde::Serialize;
use tower_cookies::Cookies;

use super::views::{LectureView, OutlineView};
use crate::auth::current_user;
use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::ledger::{self, RosterEntry};
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::Store;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressResponse {
    pub success: bool,
    pub course_id: CourseId,
    pub title: String,
    #[serde(flatten)]
    pub summary: ProgressSummary,
    pub outline: OutlineView,
}

/// GET /api/v1/progress/:course_id
pub async fn get_course_progress<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<CourseProgressResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let snapshot = ledger::course_progress(state.store.as_ref(), course_id, user)?;

    let outline = OutlineView::new(&snapshot.outline, |lecture| LectureView {
        is_viewed: Some(snapshot.is_viewed(lecture.id)),
        ..LectureView::full(lecture)
    });

    Ok(Json(CourseProgressResponse {
        success: true,
        course_id,
        title: snapshot.course.title.clone(),
        summary: snapshot.summary,
        outline,
    }))
}

#[derive(Serialize)]
pub struct ProgressUpdateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: ProgressSummary,
}

impl ProgressUpdateResponse {
    fn new(summary: ProgressSummary) -> Json<Self> {
        Json(Self {
            success: true,
            summary,
        })
    }
}

/// POST /api/v1/progress/:course_id/lecture/:lecture_id/view
pub async fn view_lecture<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, lecture_id)): Path<(CourseId, LectureId)>,
) -> Result<Json<ProgressUpdateResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let summary = ledger::set_lecture_viewed(state.store.as_ref(), course_id, lecture_id, user, true)?;
    Ok(ProgressUpdateResponse::new(summary))
}

/// POST /api/v1/progress/:course_id/lecture/:lecture_id/unview
pub async fn unview_lecture<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, lecture_id)): Path<(CourseId, LectureId)>,
) -> Result<Json<ProgressUpdateResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let summary =
        ledger::set_lecture_viewed(state.store.as_ref(), course_id, lecture_id, user, false)?;
    Ok(ProgressUpdateResponse::new(summary))
}

/// POST /api/v1/progress/:course_id/complete
pub async fn mark_completed<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<ProgressUpdateResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let summary = ledger::set_all_viewed(state.store.as_ref(), course_id, user, true)?;
    Ok(ProgressUpdateResponse::new(summary))
}

/// POST /api/v1/progress/:course_id/incomplete
pub async fn mark_incomplete<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<ProgressUpdateResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let summary = ledger::set_all_viewed(state.store.as_ref(), course_id, user, false)?;
    Ok(ProgressUpdateResponse::new(summary))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub student_id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub completed_lectures: usize,
    pub total_lectures: usize,
    pub course_progress_percent: u8,
    pub completed: bool,
    pub enrolled_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl From<RosterEntry> for StudentProgress {
    fn from(entry: RosterEntry) -> Self {
        Self {
            student_id: entry.record.student,
            name: entry.name,
            email: entry.email,
            completed_lectures: entry.summary.viewed_count,
            total_lectures: entry.summary.total_lectures,
            course_progress_percent: entry.summary.percent,
            completed: entry.summary.completed,
            enrolled_at: entry.record.enrolled_at,
            last_active: entry.record.last_active,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentsResponse {
    pub success: bool,
    pub total_lectures: usize,
    pub students: Vec<StudentProgress>,
}

/// GET /api/v1/progress/:course_id/students
pub async fn list_students<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<StudentsResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    let outline = store.load_outline(&course)?;

    let entries = ledger::roster(store, &course, &outline, state.roster_staleness)?;

    Ok(Json(StudentsResponse {
        success: true,
        total_lectures: outline.total_lectures(),
        students: entries.into_iter().map(StudentProgress::from).collect(),
    }))
}
