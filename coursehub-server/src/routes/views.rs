//! JSON views of course content shared by several endpoints

use chrono::{DateTime, Utc};
use coursehub_core::{
    average_rating, Course, CourseId, CourseOutline, Lecture, LectureId, Level, ModuleId, Quiz,
    Review, UserId,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureView {
    pub id: LectureId,
    pub title: String,
    pub duration: u32,
    pub is_preview: bool,
    pub has_video: bool,
    pub has_quiz: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_viewed: Option<bool>,
}

impl LectureView {
    /// Everything about a lecture, for creators and students working through it
    pub fn full(lecture: &Lecture) -> Self {
        Self {
            id: lecture.id,
            title: lecture.title.clone(),
            duration: lecture.duration,
            is_preview: lecture.is_preview,
            has_video: lecture.has_video(),
            has_quiz: lecture.has_quiz(),
            video_url: lecture.video_url.clone(),
            asset_id: lecture.asset_id.clone(),
            quiz: lecture.quiz.clone(),
            is_viewed: None,
        }
    }

    /// Catalog view: media and quiz answers stay hidden unless the lecture
    /// is a free preview
    pub fn public(lecture: &Lecture) -> Self {
        let mut view = Self::full(lecture);
        if !lecture.is_preview {
            view.video_url = None;
            view.asset_id = None;
            view.quiz = None;
        }
        view
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleView {
    pub id: ModuleId,
    pub title: String,
    pub lectures: Vec<LectureView>,
}

/// A course's reachable lectures in display order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineView {
    pub lectures: Vec<LectureView>,
    pub modules: Vec<ModuleView>,
    pub total_lectures: usize,
    /// Seconds
    pub total_duration: u64,
}

impl OutlineView {
    pub fn new(outline: &CourseOutline, view: impl Fn(&Lecture) -> LectureView) -> Self {
        Self {
            lectures: outline.standalone.iter().map(&view).collect(),
            modules: outline
                .modules
                .iter()
                .map(|m| ModuleView {
                    id: m.module.id,
                    title: m.module.title.clone(),
                    lectures: m.lectures.iter().map(&view).collect(),
                })
                .collect(),
            total_lectures: outline.total_lectures(),
            total_duration: outline.total_duration(),
        }
    }
}

/// Catalog card for a course
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: Level,
    pub price: u64,
    pub thumbnail: Option<String>,
    pub creators: Vec<UserId>,
    pub published: bool,
    pub lecture_count: usize,
    pub enrollment_count: usize,
    pub average_rating: Option<f64>,
    pub review_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseSummary {
    pub fn new(course: &Course, outline: &CourseOutline, reviews: &[Review]) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            level: course.level,
            price: course.price,
            thumbnail: course.thumbnail.clone(),
            creators: course.creators.clone(),
            published: course.published,
            lecture_count: outline.total_lectures(),
            enrollment_count: course.enrollments.len(),
            average_rating: average_rating(reviews),
            review_count: reviews.len(),
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}
