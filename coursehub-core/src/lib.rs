//! Coursehub Core Library
//!
//! Domain model and rules for an online course marketplace:
//! - Courses reach lectures directly or through ordered modules
//! - Students accumulate per-lecture progress toward completion
//! - A course is publishable only when every lecture carries content

pub mod course;
pub mod ids;
pub mod outline;
pub mod progress;
pub mod publish;
pub mod purchase;
pub mod quiz;
pub mod review;
pub mod user;

pub use course::{Announcement, Course, EnrollmentRecord, Lecture, LectureParent, Level, Module};
pub use ids::{AnnouncementId, CourseId, LectureId, ModuleId, PurchaseId, ReviewId, UserId};
pub use outline::{CourseOutline, OutlineModule};
pub use progress::{completion_percent, CourseProgress, LectureProgress, ProgressSummary};
pub use publish::{check_publish, incomplete_lectures, IncompleteLecture, PublishError};
pub use purchase::{CoursePurchase, PurchaseError, PurchaseStatus};
pub use quiz::{validate_quiz, Quiz, QuizError, QuizQuestion};
pub use review::{average_rating, Review, ReviewError};
pub use user::User;
