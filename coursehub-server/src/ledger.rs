//! Progress ledger operations and the enrollment stats synchronizer
//!
//! The ledger (`CourseProgress`) is the source of truth. Every write copies
//! the student's counts onto the course's embedded enrollment list so
//! instructor dashboards can read them without touching the ledger. That copy
//! is best-effort; the roster re-reads the ledger for any entry whose copy is
//! older than the configured staleness bound or counts a different number of
//! lectures than the course has now.

use chrono::{DateTime, Duration, Utc};
use coursehub_core::{
    Course, CourseId, CourseOutline, CourseProgress, EnrollmentRecord, LectureId,
    ProgressSummary, UserId,
};

use crate::error::ApiError;
use crate::store::{Store, StoreResult};

/// A course with its resolved lectures and one student's ledger entry
pub struct ProgressSnapshot {
    pub course: Course,
    pub outline: CourseOutline,
    pub progress: Option<CourseProgress>,
    pub summary: ProgressSummary,
}

impl ProgressSnapshot {
    pub fn is_viewed(&self, lecture: LectureId) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|p| p.is_viewed(lecture))
    }
}

/// Load a course `viewer` may study and everything it reaches.
///
/// Drafts are only visible to their creators; anyone else gets 404.
pub fn load_course<S: Store>(
    store: &S,
    course_id: CourseId,
    viewer: UserId,
) -> Result<(Course, CourseOutline), ApiError> {
    let course = store.get_course(course_id)?.ok_or(ApiError::CourseNotFound)?;
    if !course.published && !course.is_creator(viewer) {
        tracing::debug!(course = %course_id, user = %viewer, "Draft hidden from non-creator");
        return Err(ApiError::CourseNotFound);
    }
    let outline = store.load_outline(&course)?;
    Ok((course, outline))
}

/// Current progress of `user` in a course.
///
/// A stored completion flag that no longer matches the course is corrected
/// on the way out.
pub fn course_progress<S: Store>(
    store: &S,
    course_id: CourseId,
    user: UserId,
) -> Result<ProgressSnapshot, ApiError> {
    let (course, outline) = load_course(store, course_id, user)?;
    let reachable = outline.lecture_ids();

    let Some(stored) = store.get_progress(user, course_id)? else {
        let summary = ProgressSummary::new(0, reachable.len());
        return Ok(ProgressSnapshot {
            course,
            outline,
            progress: None,
            summary,
        });
    };

    let summary = stored.summarize(reachable);
    let progress = if stored.completed != summary.completed {
        tracing::debug!(
            course = %course_id,
            user = %user,
            completed = summary.completed,
            "Correcting stale completion flag"
        );
        store.upsert_progress(user, course_id, &mut |p| {
            p.refresh_completed(reachable);
        })?
    } else {
        stored
    };

    Ok(ProgressSnapshot {
        course,
        outline,
        progress: Some(progress),
        summary,
    })
}

/// Flag one lecture as viewed or not viewed
pub fn set_lecture_viewed<S: Store>(
    store: &S,
    course_id: CourseId,
    lecture_id: LectureId,
    user: UserId,
    viewed: bool,
) -> Result<ProgressSummary, ApiError> {
    let (_, outline) = load_course(store, course_id, user)?;
    if !outline.contains(lecture_id) {
        return Err(ApiError::LectureNotFound);
    }

    let reachable = outline.lecture_ids();
    let mut summary = ProgressSummary::new(0, reachable.len());
    store.upsert_progress(user, course_id, &mut |p| {
        p.set_viewed(lecture_id, viewed);
        summary = p.refresh_completed(reachable).0;
    })?;

    tracing::info!(
        course = %course_id,
        lecture = %lecture_id,
        user = %user,
        viewed,
        percent = summary.percent,
        "Lecture progress updated"
    );

    sync_after_write(store, course_id, user, &summary);
    Ok(summary)
}

/// Flag every reachable lecture as viewed or not viewed
pub fn set_all_viewed<S: Store>(
    store: &S,
    course_id: CourseId,
    user: UserId,
    viewed: bool,
) -> Result<ProgressSummary, ApiError> {
    let (_, outline) = load_course(store, course_id, user)?;
    let reachable = outline.lecture_ids();

    let mut summary = ProgressSummary::new(0, reachable.len());
    store.upsert_progress(user, course_id, &mut |p| {
        p.set_all(reachable, viewed);
        summary = p.refresh_completed(reachable).0;
    })?;

    tracing::info!(
        course = %course_id,
        user = %user,
        viewed,
        "Course marked {}",
        if viewed { "completed" } else { "incomplete" }
    );

    sync_after_write(store, course_id, user, &summary);
    Ok(summary)
}

fn sync_after_write<S: Store>(store: &S, course_id: CourseId, user: UserId, summary: &ProgressSummary) {
    if let Err(e) = sync_enrollment_stats(
        store,
        course_id,
        user,
        summary.viewed_count,
        summary.total_lectures,
    ) {
        tracing::warn!(
            course = %course_id,
            user = %user,
            error = %e,
            "Failed to sync enrollment stats"
        );
    }
}

/// Copy a student's counts onto the course's embedded enrollment list,
/// enrolling the student on first contact
pub fn sync_enrollment_stats<S: Store>(
    store: &S,
    course_id: CourseId,
    user: UserId,
    completed_lectures: usize,
    total_lectures: usize,
) -> StoreResult<()> {
    let now = Utc::now();
    let mut newly_enrolled = false;
    store.modify_course(course_id, &mut |course| {
        newly_enrolled = course.record_enrollment_stats(user, completed_lectures, total_lectures, now);
    })?;

    if newly_enrolled {
        tracing::info!(course = %course_id, user = %user, "Student enrolled");
        store.add_enrolled_course(user, course_id)?;
    }

    Ok(())
}

/// One student as shown on an instructor's roster
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub record: EnrollmentRecord,
    pub name: Option<String>,
    pub email: Option<String>,
    pub summary: ProgressSummary,
}

fn is_stale(record: &EnrollmentRecord, total: usize, now: DateTime<Utc>, max_age: Duration) -> bool {
    record.total_lectures != total || now - record.stats_synced_at > max_age
}

/// Enrollment stats for every student of a course, refreshing stale entries
/// from the ledger
pub fn roster<S: Store>(
    store: &S,
    course: &Course,
    outline: &CourseOutline,
    max_age: Duration,
) -> Result<Vec<RosterEntry>, ApiError> {
    let now = Utc::now();
    let reachable = outline.lecture_ids();
    let total = reachable.len();

    let mut records = course.enrollments.clone();
    let mut refreshed = Vec::new();
    for record in records.iter_mut().filter(|r| is_stale(r, total, now, max_age)) {
        let summary = match store.get_progress(record.student, course.id)? {
            Some(progress) => progress.summarize(reachable),
            None => ProgressSummary::new(0, total),
        };
        record.completed_lectures = summary.viewed_count;
        record.total_lectures = total;
        record.stats_synced_at = now;
        refreshed.push(record.clone());
    }

    if !refreshed.is_empty() {
        tracing::debug!(course = %course.id, count = refreshed.len(), "Refreshing stale roster stats");
        let write_back = store.modify_course(course.id, &mut |c| {
            for fresh in &refreshed {
                if let Some(record) = c.enrollments.iter_mut().find(|r| r.student == fresh.student) {
                    record.completed_lectures = fresh.completed_lectures;
                    record.total_lectures = fresh.total_lectures;
                    record.stats_synced_at = fresh.stats_synced_at;
                }
            }
        });
        if let Err(e) = write_back {
            tracing::warn!(course = %course.id, error = %e, "Failed to store refreshed roster stats");
        }
    }

    records
        .into_iter()
        .map(|record| -> Result<RosterEntry, ApiError> {
            let user = store.get_user(record.student)?;
            let summary = ProgressSummary::new(record.completed_lectures, record.total_lectures);
            Ok(RosterEntry {
                name: user.as_ref().map(|u| u.name.clone()),
                email: user.map(|u| u.email),
                summary,
                record,
            })
        })
        .collect()
}
