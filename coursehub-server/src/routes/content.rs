//! Module, lecture and quiz authoring endpoints

use std::sync::Arc;

use axum::extract::State;
use coursehub_core::{
    validate_quiz, Course, CourseId, Lecture, LectureId, LectureParent, Module, ModuleId, Quiz,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use super::views::LectureView;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::{Store, StoreResult};

/// Put a published course back to draft once it reaches no lectures.
///
/// Returns whether the course was unpublished.
fn unpublish_if_empty<S: Store>(store: &S, course_id: CourseId) -> StoreResult<bool> {
    let mut unpublished = false;
    store.modify_course_with_outline(course_id, &mut |course, outline| {
        unpublished = course.published && outline.is_empty();
        if unpublished {
            course.published = false;
        }
    })?;

    if unpublished {
        tracing::info!(course = %course_id, "Course has no lectures left, reverted to draft");
    }
    Ok(unpublished)
}

fn module_of<S: Store>(store: &S, course: &Course, module_id: ModuleId) -> Result<Module, ApiError> {
    store
        .get_module(module_id)?
        .filter(|m| m.course == course.id)
        .ok_or(ApiError::ModuleNotFound)
}

fn lecture_of<S: Store>(store: &S, course: &Course, lecture_id: LectureId) -> Result<Lecture, ApiError> {
    store
        .get_lecture(lecture_id)?
        .filter(|l| l.course == course.id)
        .ok_or(ApiError::LectureNotFound)
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
pub struct CreateModuleRequest {
    pub title: String,
}

#[derive(Serialize)]
pub struct ModuleResponse {
    pub success: bool,
    pub module: Module,
}

/// POST /api/v1/courses/:course_id/modules
pub async fn create_module<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
    Json(req): Json<CreateModuleRequest>,
) -> Result<Json<ModuleResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    super::creator_course(store, course_id, user)?;

    let module = Module::new(course_id, required("Title", &req.title)?);
    store.insert_module(&module)?;
    store.modify_course(course_id, &mut |c| c.modules.push(module.id))?;
    tracing::info!(course = %course_id, module = %module.id, "Module created");

    Ok(Json(ModuleResponse {
        success: true,
        module,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalResponse {
    pub success: bool,
    /// Set when the removal left a published course without lectures
    pub unpublished: bool,
}

/// DELETE /api/v1/courses/:course_id/modules/:module_id
///
/// Deletes the module's lectures along with it.
pub async fn delete_module<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, module_id)): Path<(CourseId, ModuleId)>,
) -> Result<Json<RemovalResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    let module = module_of(store, &course, module_id)?;

    store.modify_course(course_id, &mut |c| c.modules.retain(|id| *id != module_id))?;
    for lecture in &module.lectures {
        store.delete_lecture(*lecture)?;
    }
    store.delete_module(module_id)?;
    tracing::info!(
        course = %course_id,
        module = %module_id,
        lectures = module.lectures.len(),
        "Module deleted"
    );

    let unpublished = unpublish_if_empty(store, course_id)?;
    Ok(Json(RemovalResponse {
        success: true,
        unpublished,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLectureRequest {
    pub title: String,
    pub video_url: Option<String>,
    pub asset_id: Option<String>,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Serialize)]
pub struct LectureResponse {
    pub success: bool,
    pub lecture: LectureView,
}

impl LectureResponse {
    fn new(lecture: &Lecture) -> Json<Self> {
        Json(Self {
            success: true,
            lecture: LectureView::full(lecture),
        })
    }
}

fn build_lecture(course_id: CourseId, parent: LectureParent, req: CreateLectureRequest) -> Result<Lecture, ApiError> {
    let mut lecture = Lecture::new(course_id, parent, required("Title", &req.title)?);
    lecture.video_url = non_blank(req.video_url);
    lecture.asset_id = non_blank(req.asset_id);
    lecture.duration = req.duration;
    lecture.is_preview = req.is_preview;
    Ok(lecture)
}

/// POST /api/v1/courses/:course_id/lectures
///
/// Attaches the lecture directly to the course, outside any module.
pub async fn create_lecture<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
    Json(req): Json<CreateLectureRequest>,
) -> Result<Json<LectureResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    super::creator_course(store, course_id, user)?;

    let lecture = build_lecture(course_id, LectureParent::Course(course_id), req)?;
    store.insert_lecture(&lecture)?;
    store.modify_course(course_id, &mut |c| c.lectures.push(lecture.id))?;
    tracing::info!(course = %course_id, lecture = %lecture.id, "Lecture created");

    Ok(LectureResponse::new(&lecture))
}

/// POST /api/v1/courses/:course_id/modules/:module_id/lectures
pub async fn create_module_lecture<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, module_id)): Path<(CourseId, ModuleId)>,
    Json(req): Json<CreateLectureRequest>,
) -> Result<Json<LectureResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    module_of(store, &course, module_id)?;

    let lecture = build_lecture(course_id, LectureParent::Module(module_id), req)?;
    store.insert_lecture(&lecture)?;
    store.modify_module(module_id, &mut |m| m.lectures.push(lecture.id))?;
    tracing::info!(
        course = %course_id,
        module = %module_id,
        lecture = %lecture.id,
        "Lecture created"
    );

    Ok(LectureResponse::new(&lecture))
}

/// Lecture fields a creator may change. An empty `videoUrl` or `assetId`
/// clears the stored value.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLectureRequest {
    pub title: Option<String>,
    pub video_url: Option<String>,
    pub asset_id: Option<String>,
    pub duration: Option<u32>,
    pub is_preview: Option<bool>,
}

/// PATCH /api/v1/courses/:course_id/lectures/:lecture_id
pub async fn update_lecture<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, lecture_id)): Path<(CourseId, LectureId)>,
    Json(req): Json<UpdateLectureRequest>,
) -> Result<Json<LectureResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    lecture_of(store, &course, lecture_id)?;

    let title = req.title.as_deref().map(|t| required("Title", t)).transpose()?;

    let lecture = store.modify_lecture(lecture_id, &mut |lecture| {
        if let Some(title) = &title {
            lecture.title = title.clone();
        }
        if req.video_url.is_some() {
            lecture.video_url = non_blank(req.video_url.clone());
        }
        if req.asset_id.is_some() {
            lecture.asset_id = non_blank(req.asset_id.clone());
        }
        if let Some(duration) = req.duration {
            lecture.duration = duration;
        }
        if let Some(is_preview) = req.is_preview {
            lecture.is_preview = is_preview;
        }
    })?;

    Ok(LectureResponse::new(&lecture))
}

/// DELETE /api/v1/courses/:course_id/lectures/:lecture_id
pub async fn delete_lecture<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, lecture_id)): Path<(CourseId, LectureId)>,
) -> Result<Json<RemovalResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    let lecture = lecture_of(store, &course, lecture_id)?;

    match lecture.parent {
        LectureParent::Course(_) => {
            store.modify_course(course_id, &mut |c| c.detach_lecture(lecture_id))?;
        }
        LectureParent::Module(module_id) => {
            let detached =
                store.modify_module(module_id, &mut |m| m.lectures.retain(|id| *id != lecture_id));
            // A lecture whose module is already gone only needs its own document removed
            if let Err(e) = detached {
                tracing::debug!(module = %module_id, error = %e, "Parent module missing");
            }
        }
    }
    store.delete_lecture(lecture_id)?;
    tracing::info!(course = %course_id, lecture = %lecture_id, "Lecture deleted");

    let unpublished = unpublish_if_empty(store, course_id)?;
    Ok(Json(RemovalResponse {
        success: true,
        unpublished,
    }))
}

/// PUT /api/v1/courses/:course_id/lectures/:lecture_id/quiz
pub async fn set_quiz<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, lecture_id)): Path<(CourseId, LectureId)>,
    Json(quiz): Json<Quiz>,
) -> Result<Json<LectureResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    lecture_of(store, &course, lecture_id)?;

    validate_quiz(&quiz).inspect_err(|e| {
        tracing::debug!(lecture = %lecture_id, reason = %e, "Quiz rejected");
    })?;

    let lecture = store.modify_lecture(lecture_id, &mut |l| l.quiz = Some(quiz.clone()))?;
    tracing::info!(
        lecture = %lecture_id,
        questions = quiz.questions.len(),
        "Quiz saved"
    );

    Ok(LectureResponse::new(&lecture))
}

/// DELETE /api/v1/courses/:course_id/lectures/:lecture_id/quiz
pub async fn remove_quiz<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path((course_id, lecture_id)): Path<(CourseId, LectureId)>,
) -> Result<Json<LectureResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    lecture_of(store, &course, lecture_id)?;

    let lecture = store.modify_lecture(lecture_id, &mut |l| l.quiz = None)?;
    tracing::info!(lecture = %lecture_id, "Quiz removed");

    Ok(LectureResponse::new(&lecture))
}
