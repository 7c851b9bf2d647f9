//! Course, module and lecture documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnnouncementId, CourseId, LectureId, ModuleId, UserId};
use crate::quiz::Quiz;

/// Difficulty level advertised in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

/// A course as sold in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: Level,
    /// Price in minor currency units
    pub price: u64,
    pub thumbnail: Option<String>,
    pub creators: Vec<UserId>,
    /// Lectures attached directly to the course, outside any module
    pub lectures: Vec<LectureId>,
    pub modules: Vec<ModuleId>,
    /// Per-student progress counts, denormalized from the progress ledger
    pub enrollments: Vec<EnrollmentRecord>,
    pub published: bool,
    pub announcements: Vec<Announcement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Create an unpublished, empty course owned by `creator`
    pub fn new(title: impl Into<String>, creator: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CourseId::new(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            level: Level::default(),
            price: 0,
            thumbnail: None,
            creators: vec![creator],
            lectures: Vec::new(),
            modules: Vec::new(),
            enrollments: Vec::new(),
            published: false,
            announcements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_creator(&self, user: UserId) -> bool {
        self.creators.contains(&user)
    }

    pub fn enrollment(&self, student: UserId) -> Option<&EnrollmentRecord> {
        self.enrollments.iter().find(|e| e.student == student)
    }

    /// Write a student's progress counts onto the embedded enrollment list.
    ///
    /// Returns `true` when the student had no enrollment record yet.
    pub fn record_enrollment_stats(
        &mut self,
        student: UserId,
        completed_lectures: usize,
        total_lectures: usize,
        now: DateTime<Utc>,
    ) -> bool {
        if let Some(record) = self.enrollments.iter_mut().find(|e| e.student == student) {
            record.completed_lectures = completed_lectures;
            record.total_lectures = total_lectures;
            record.last_active = now;
            record.stats_synced_at = now;
            return false;
        }

        self.enrollments.push(EnrollmentRecord {
            student,
            enrolled_at: now,
            completed_lectures,
            total_lectures,
            last_active: now,
            stats_synced_at: now,
        });
        true
    }

    /// Remove a lecture reference from the legacy list
    pub fn detach_lecture(&mut self, lecture: LectureId) {
        self.lectures.retain(|id| *id != lecture);
    }
}

/// A student's registration in a course with cached progress counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub student: UserId,
    pub enrolled_at: DateTime<Utc>,
    pub completed_lectures: usize,
    pub total_lectures: usize,
    pub last_active: DateTime<Utc>,
    /// When the counts were last copied from the ledger
    pub stats_synced_at: DateTime<Utc>,
}

/// An instructor message posted to a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub author: UserId,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(author: UserId, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: AnnouncementId::new(),
            author,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered grouping of lectures within a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub course: CourseId,
    pub title: String,
    pub lectures: Vec<LectureId>,
    pub created_at: DateTime<Utc>,
}

impl Module {
    pub fn new(course: CourseId, title: impl Into<String>) -> Self {
        Self {
            id: ModuleId::new(),
            course,
            title: title.into(),
            lectures: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Where a lecture sits inside its course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum LectureParent {
    /// Attached directly to the course
    Course(CourseId),
    /// Listed inside a module
    Module(ModuleId),
}

/// Atomic content unit: a video, a quiz, or both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: LectureId,
    /// Owning course, whatever the parent
    pub course: CourseId,
    pub parent: LectureParent,
    pub title: String,
    pub video_url: Option<String>,
    /// Media provider asset id for the video
    pub asset_id: Option<String>,
    /// Duration in seconds
    pub duration: u32,
    pub is_preview: bool,
    pub quiz: Option<Quiz>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lecture {
    pub fn new(course: CourseId, parent: LectureParent, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: LectureId::new(),
            course,
            parent,
            title: title.into(),
            video_url: None,
            asset_id: None,
            duration: 0,
            is_preview: false,
            quiz: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_video(&self) -> bool {
        self.video_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    pub fn has_quiz(&self) -> bool {
        self.quiz.as_ref().is_some_and(|q| !q.questions.is_empty())
    }

    /// A lecture counts as complete content once it has a video or a quiz
    pub fn is_complete(&self) -> bool {
        self.has_video() || self.has_quiz()
    }
}
