//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use coursehub_core::{
    Course, CourseId, CourseOutline, CourseProgress, Lecture, LectureId, Module, ModuleId, Review, ReviewId,
    User, UserId,
};

use super::{
    CourseStore, ProgressStore, ReviewStore, StoreResult, UserStore, REVIEW_CONFLICT,
};
use crate::error::ApiError;

/// In-memory store implementing every storage trait
pub struct InMemoryStore {
    courses: RwLock<HashMap<CourseId, Course>>,
    modules: RwLock<HashMap<ModuleId, Module>>,
    lectures: RwLock<HashMap<LectureId, Lecture>>,
    progress: RwLock<HashMap<(UserId, CourseId), CourseProgress>>,
    reviews: RwLock<HashMap<ReviewId, Review>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            courses: RwLock::new(HashMap::new()),
            modules: RwLock::new(HashMap::new()),
            lectures: RwLock::new(HashMap::new()),
            progress: RwLock::new(HashMap::new()),
            reviews: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))
}

impl CourseStore for InMemoryStore {
    fn insert_course(&self, course: &Course) -> StoreResult<()> {
        write(&self.courses)?.insert(course.id, course.clone());
        Ok(())
    }

    fn get_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        Ok(read(&self.courses)?.get(&id).cloned())
    }

    fn modify_course(
        &self,
        id: CourseId,
        update: &mut dyn FnMut(&mut Course),
    ) -> StoreResult<Course> {
        let mut courses = write(&self.courses)?;
        let course = courses.get_mut(&id).ok_or(ApiError::CourseNotFound)?;
        update(course);
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    fn modify_course_with_outline(
        &self,
        id: CourseId,
        update: &mut dyn FnMut(&mut Course, &CourseOutline),
    ) -> StoreResult<Course> {
        let mut courses = write(&self.courses)?;
        let course = courses.get_mut(&id).ok_or(ApiError::CourseNotFound)?;
        // Lock order: courses, then modules, then lectures
        let outline = CourseOutline::build(course, self.list_modules(id)?, self.list_lectures(id)?);
        update(course, &outline);
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let mut courses: Vec<_> = read(&self.courses)?.values().cloned().collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    fn delete_course(&self, id: CourseId) -> StoreResult<()> {
        if write(&self.courses)?.remove(&id).is_none() {
            return Err(ApiError::CourseNotFound);
        }
        write(&self.modules)?.retain(|_, m| m.course != id);
        write(&self.lectures)?.retain(|_, l| l.course != id);
        write(&self.progress)?.retain(|(_, course), _| *course != id);
        write(&self.reviews)?.retain(|_, r| r.course != id);
        Ok(())
    }

    fn insert_module(&self, module: &Module) -> StoreResult<()> {
        write(&self.modules)?.insert(module.id, module.clone());
        Ok(())
    }

    fn get_module(&self, id: ModuleId) -> StoreResult<Option<Module>> {
        Ok(read(&self.modules)?.get(&id).cloned())
    }

    fn modify_module(
        &self,
        id: ModuleId,
        update: &mut dyn FnMut(&mut Module),
    ) -> StoreResult<Module> {
        let mut modules = write(&self.modules)?;
        let module = modules.get_mut(&id).ok_or(ApiError::ModuleNotFound)?;
        update(module);
        Ok(module.clone())
    }

    fn delete_module(&self, id: ModuleId) -> StoreResult<()> {
        write(&self.modules)?.remove(&id);
        Ok(())
    }

    fn list_modules(&self, course: CourseId) -> StoreResult<Vec<Module>> {
        Ok(read(&self.modules)?
            .values()
            .filter(|m| m.course == course)
            .cloned()
            .collect())
    }

    fn insert_lecture(&self, lecture: &Lecture) -> StoreResult<()> {
        write(&self.lectures)?.insert(lecture.id, lecture.clone());
        Ok(())
    }

    fn get_lecture(&self, id: LectureId) -> StoreResult<Option<Lecture>> {
        Ok(read(&self.lectures)?.get(&id).cloned())
    }

    fn modify_lecture(
        &self,
        id: LectureId,
        update: &mut dyn FnMut(&mut Lecture),
    ) -> StoreResult<Lecture> {
        let mut lectures = write(&self.lectures)?;
        let lecture = lectures.get_mut(&id).ok_or(ApiError::LectureNotFound)?;
        update(lecture);
        lecture.updated_at = Utc::now();
        Ok(lecture.clone())
    }

    fn delete_lecture(&self, id: LectureId) -> StoreResult<()> {
        write(&self.lectures)?.remove(&id);
        Ok(())
    }

    fn list_lectures(&self, course: CourseId) -> StoreResult<Vec<Lecture>> {
        Ok(read(&self.lectures)?
            .values()
            .filter(|l| l.course == course)
            .cloned()
            .collect())
    }
}

impl ProgressStore for InMemoryStore {
    fn get_progress(&self, user: UserId, course: CourseId) -> StoreResult<Option<CourseProgress>> {
        Ok(read(&self.progress)?.get(&(user, course)).cloned())
    }

    fn upsert_progress(
        &self,
        user: UserId,
        course: CourseId,
        update: &mut dyn FnMut(&mut CourseProgress),
    ) -> StoreResult<CourseProgress> {
        let mut progress = write(&self.progress)?;
        let entry = progress
            .entry((user, course))
            .or_insert_with(|| CourseProgress::new(user, course));
        update(entry);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }
}

impl ReviewStore for InMemoryStore {
    fn insert_review(&self, review: &Review) -> StoreResult<()> {
        let mut reviews = write(&self.reviews)?;
        if reviews
            .values()
            .any(|r| r.course == review.course && r.user == review.user)
        {
            return Err(ApiError::Conflict(REVIEW_CONFLICT.to_string()));
        }
        reviews.insert(review.id, review.clone());
        Ok(())
    }

    fn find_review(&self, course: CourseId, user: UserId) -> StoreResult<Option<Review>> {
        Ok(read(&self.reviews)?
            .values()
            .find(|r| r.course == course && r.user == user)
            .cloned())
    }

    fn list_reviews(&self, course: CourseId) -> StoreResult<Vec<Review>> {
        let mut reviews: Vec<_> = read(&self.reviews)?
            .values()
            .filter(|r| r.course == course)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

impl UserStore for InMemoryStore {
    fn insert_user(&self, user: &User) -> StoreResult<()> {
        write(&self.users)?.insert(user.id, user.clone());
        Ok(())
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    fn add_enrolled_course(&self, user: UserId, course: CourseId) -> StoreResult<()> {
        if let Some(user) = write(&self.users)?.get_mut(&user) {
            user.enroll(course);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_core::LectureParent;

    #[test]
    fn test_upsert_progress_creates_then_updates() {
        let store = InMemoryStore::new();
        let (user, course, lecture) = (UserId::new(), CourseId::new(), LectureId::new());

        assert!(store.get_progress(user, course).unwrap().is_none());

        store
            .upsert_progress(user, course, &mut |p| p.set_viewed(lecture, true))
            .unwrap();
        let stored = store.get_progress(user, course).unwrap().unwrap();
        assert!(stored.is_viewed(lecture));

        store
            .upsert_progress(user, course, &mut |p| p.set_viewed(lecture, false))
            .unwrap();
        let stored = store.get_progress(user, course).unwrap().unwrap();
        assert!(!stored.is_viewed(lecture));
        assert_eq!(stored.lectures.len(), 1);
    }

    #[test]
    fn test_delete_course_cascades() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let course = Course::new("Cascade", owner);
        let other = Course::new("Survivor", owner);
        store.insert_course(&course).unwrap();
        store.insert_course(&other).unwrap();

        let module = Module::new(course.id, "M");
        store.insert_module(&module).unwrap();
        let lecture = Lecture::new(course.id, LectureParent::Module(module.id), "L");
        store.insert_lecture(&lecture).unwrap();
        let kept = Lecture::new(other.id, LectureParent::Course(other.id), "K");
        store.insert_lecture(&kept).unwrap();
        store
            .upsert_progress(owner, course.id, &mut |p| p.set_viewed(lecture.id, true))
            .unwrap();
        store
            .insert_review(&Review::new(course.id, owner, 4, "").unwrap())
            .unwrap();

        store.delete_course(course.id).unwrap();

        assert!(store.get_course(course.id).unwrap().is_none());
        assert!(store.get_module(module.id).unwrap().is_none());
        assert!(store.get_lecture(lecture.id).unwrap().is_none());
        assert!(store.get_progress(owner, course.id).unwrap().is_none());
        assert!(store.list_reviews(course.id).unwrap().is_empty());
        assert!(store.get_lecture(kept.id).unwrap().is_some());
    }

    #[test]
    fn test_second_review_conflicts() {
        let store = InMemoryStore::new();
        let (course, user) = (CourseId::new(), UserId::new());
        store
            .insert_review(&Review::new(course, user, 5, "first").unwrap())
            .unwrap();
        let err = store
            .insert_review(&Review::new(course, user, 1, "second").unwrap())
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_modify_missing_course() {
        let store = InMemoryStore::new();
        let err = store
            .modify_course(CourseId::new(), &mut |c| c.published = true)
            .unwrap_err();
        assert!(matches!(err, ApiError::CourseNotFound));
    }
}
