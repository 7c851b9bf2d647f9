//! Course catalog, authoring and publishing endpoints

use std::sync::Arc;

use axum::extract::State;
use coursehub_core::{
    check_publish, incomplete_lectures, Course, CourseId, IncompleteLecture, Level,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use super::views::{CourseSummary, LectureView, OutlineView};
use crate::auth::current_user;
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::Store;

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub level: Option<Level>,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub success: bool,
    pub courses: Vec<CourseSummary>,
}

/// GET /api/v1/courses
pub async fn list_courses<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let store = state.store.as_ref();
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let mut courses = Vec::new();
    for course in store.list_courses()? {
        if !course.published
            || category.is_some_and(|c| !course.category.eq_ignore_ascii_case(c))
            || query.level.is_some_and(|l| course.level != l)
        {
            continue;
        }
        let outline = store.load_outline(&course)?;
        let reviews = store.list_reviews(course.id)?;
        courses.push(CourseSummary::new(&course, &outline, &reviews));
    }

    Ok(Json(CatalogResponse {
        success: true,
        courses,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub price: i64,
    pub thumbnail: Option<String>,
}

#[derive(Serialize)]
pub struct CourseResponse {
    pub success: bool,
    pub course: Course,
}

fn required_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    Ok(title.to_string())
}

fn valid_price(price: i64) -> Result<u64, ApiError> {
    u64::try_from(price).map_err(|_| ApiError::Validation("Price cannot be negative".to_string()))
}

/// POST /api/v1/courses
pub async fn create_course<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Json(req): Json<CreateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;

    let mut course = Course::new(required_title(&req.title)?, user);
    course.description = req.description.trim().to_string();
    course.category = req.category.trim().to_string();
    course.level = req.level;
    course.price = valid_price(req.price)?;
    course.thumbnail = req.thumbnail.filter(|t| !t.trim().is_empty());

    state.store.insert_course(&course)?;
    tracing::info!(course = %course.id, creator = %user, "Course created");

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    pub success: bool,
    pub course: CourseSummary,
    pub outline: OutlineView,
    pub is_creator: bool,
}

/// GET /api/v1/courses/:course_id
pub async fn get_course<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<CourseDetailResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let (course, is_creator) = super::visible_course(&*state, &cookies, course_id)?;
    let store = state.store.as_ref();
    let outline = store.load_outline(&course)?;
    let reviews = store.list_reviews(course_id)?;

    let view = if is_creator {
        OutlineView::new(&outline, LectureView::full)
    } else {
        OutlineView::new(&outline, LectureView::public)
    };

    Ok(Json(CourseDetailResponse {
        success: true,
        course: CourseSummary::new(&course, &outline, &reviews),
        outline: view,
        is_creator,
    }))
}

/// Fields a creator may change; the publish flag has its own endpoint
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<Level>,
    pub price: Option<i64>,
    pub thumbnail: Option<String>,
}

/// PATCH /api/v1/courses/:course_id
pub async fn update_course<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    super::creator_course(state.store.as_ref(), course_id, user)?;

    let title = req.title.as_deref().map(required_title).transpose()?;
    let price = req.price.map(valid_price).transpose()?;

    let course = state.store.modify_course(course_id, &mut |course| {
        if let Some(title) = &title {
            course.title = title.clone();
        }
        if let Some(description) = &req.description {
            course.description = description.trim().to_string();
        }
        if let Some(category) = &req.category {
            course.category = category.trim().to_string();
        }
        if let Some(level) = req.level {
            course.level = level;
        }
        if let Some(price) = price {
            course.price = price;
        }
        if let Some(thumbnail) = &req.thumbnail {
            course.thumbnail = Some(thumbnail.trim().to_string()).filter(|t| !t.is_empty());
        }
    })?;

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// DELETE /api/v1/courses/:course_id
pub async fn delete_course<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<DeleteResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    super::creator_course(state.store.as_ref(), course_id, user)?;

    state.store.delete_course(course_id)?;
    tracing::info!(course = %course_id, user = %user, "Course deleted");

    Ok(Json(DeleteResponse { success: true }))
}

#[derive(Deserialize)]
pub struct PublishQuery {
    pub publish: bool,
}

#[derive(Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub published: bool,
}

/// PATCH /api/v1/courses/:course_id/publish?publish=bool
///
/// A rejected publish leaves the course as a draft.
pub async fn set_published<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
    Query(query): Query<PublishQuery>,
) -> Result<Json<PublishResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    super::creator_course(store, course_id, user)?;

    let mut rejected = None;
    let course = store.modify_course_with_outline(course_id, &mut |course, outline| {
        match check_publish(outline, query.publish) {
            Ok(()) => course.published = query.publish,
            Err(e) => {
                course.published = false;
                rejected = Some(e);
            }
        }
    })?;

    if let Some(e) = rejected {
        tracing::info!(course = %course_id, reason = %e, "Publish rejected");
        return Err(e.into());
    }
    tracing::info!(course = %course_id, published = course.published, "Publish state changed");

    Ok(Json(PublishResponse {
        success: true,
        published: course.published,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub success: bool,
    pub eligible: bool,
    pub total_lectures: usize,
    pub incomplete_lectures: Vec<IncompleteLecture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/v1/courses/:course_id/publish-eligibility
pub async fn publish_eligibility<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<EligibilityResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    let store = state.store.as_ref();
    let course = super::creator_course(store, course_id, user)?;
    let outline = store.load_outline(&course)?;

    let verdict = check_publish(&outline, true);

    Ok(Json(EligibilityResponse {
        success: true,
        eligible: verdict.is_ok(),
        total_lectures: outline.total_lectures(),
        incomplete_lectures: incomplete_lectures(&outline),
        message: verdict.err().map(|e| e.to_string()),
    }))
}
