//! Storage abstractions for the course service
//!
//! Every mutation of an existing document goes through a `modify_*` call that
//! applies a closure under the store's own lock or transaction, so concurrent
//! requests never overwrite each other's read-modify-write cycle.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use coursehub_core::{
    Course, CourseId, CourseOutline, CourseProgress, Lecture, LectureId, Module, ModuleId, Review,
    User, UserId,
};

use crate::error::ApiError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ApiError>;

/// Courses and the modules and lectures they own
pub trait CourseStore: Send + Sync {
    fn insert_course(&self, course: &Course) -> StoreResult<()>;

    fn get_course(&self, id: CourseId) -> StoreResult<Option<Course>>;

    /// Apply `update` to a stored course and return the result
    fn modify_course(
        &self,
        id: CourseId,
        update: &mut dyn FnMut(&mut Course),
    ) -> StoreResult<Course>;

    /// Apply `update` to a stored course together with the outline it
    /// resolves to, both read in the same atomic step
    fn modify_course_with_outline(
        &self,
        id: CourseId,
        update: &mut dyn FnMut(&mut Course, &CourseOutline),
    ) -> StoreResult<Course>;

    /// All courses, newest first
    fn list_courses(&self) -> StoreResult<Vec<Course>>;

    /// Delete a course along with its modules, lectures, progress and reviews
    fn delete_course(&self, id: CourseId) -> StoreResult<()>;

    fn insert_module(&self, module: &Module) -> StoreResult<()>;

    fn get_module(&self, id: ModuleId) -> StoreResult<Option<Module>>;

    fn modify_module(
        &self,
        id: ModuleId,
        update: &mut dyn FnMut(&mut Module),
    ) -> StoreResult<Module>;

    fn delete_module(&self, id: ModuleId) -> StoreResult<()>;

    fn list_modules(&self, course: CourseId) -> StoreResult<Vec<Module>>;

    fn insert_lecture(&self, lecture: &Lecture) -> StoreResult<()>;

    fn get_lecture(&self, id: LectureId) -> StoreResult<Option<Lecture>>;

    fn modify_lecture(
        &self,
        id: LectureId,
        update: &mut dyn FnMut(&mut Lecture),
    ) -> StoreResult<Lecture>;

    fn delete_lecture(&self, id: LectureId) -> StoreResult<()>;

    /// Every lecture owned by a course, reachable or not
    fn list_lectures(&self, course: CourseId) -> StoreResult<Vec<Lecture>>;

    /// Resolve the lectures a course currently reaches
    fn load_outline(&self, course: &Course) -> StoreResult<CourseOutline> {
        let modules = self.list_modules(course.id)?;
        let lectures = self.list_lectures(course.id)?;
        Ok(CourseOutline::build(course, modules, lectures))
    }
}

/// The per-student progress ledger
pub trait ProgressStore: Send + Sync {
    fn get_progress(&self, user: UserId, course: CourseId) -> StoreResult<Option<CourseProgress>>;

    /// Load the ledger document (creating an empty one if missing), apply
    /// `update`, persist and return it, all as one atomic step
    fn upsert_progress(
        &self,
        user: UserId,
        course: CourseId,
        update: &mut dyn FnMut(&mut CourseProgress),
    ) -> StoreResult<CourseProgress>;
}

pub trait ReviewStore: Send + Sync {
    /// Store a review; fails with `Conflict` if the user already reviewed the course
    fn insert_review(&self, review: &Review) -> StoreResult<()>;

    fn find_review(&self, course: CourseId, user: UserId) -> StoreResult<Option<Review>>;

    /// Reviews for a course, newest first
    fn list_reviews(&self, course: CourseId) -> StoreResult<Vec<Review>>;
}

/// Read access to accounts provisioned by the authentication service
pub trait UserStore: Send + Sync {
    fn insert_user(&self, user: &User) -> StoreResult<()>;

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Record that a user is enrolled in a course; unknown users are ignored
    fn add_enrolled_course(&self, user: UserId, course: CourseId) -> StoreResult<()>;
}

/// Everything the HTTP layer needs from persistence
pub trait Store: CourseStore + ProgressStore + ReviewStore + UserStore {}

impl<T> Store for T where T: CourseStore + ProgressStore + ReviewStore + UserStore {}

pub(crate) const REVIEW_CONFLICT: &str = "You have already reviewed this course";
