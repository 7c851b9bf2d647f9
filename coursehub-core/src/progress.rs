//! Per-student course progress ledger

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, LectureId, UserId};

/// Viewed flag for one lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureProgress {
    pub lecture_id: LectureId,
    pub viewed: bool,
}

/// One ledger document per (user, course) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub user: UserId,
    pub course: CourseId,
    /// May still mention lectures that have since left the course
    pub lectures: Vec<LectureProgress>,
    /// Stored completion flag; kept in line with the course on every read
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl CourseProgress {
    pub fn new(user: UserId, course: CourseId) -> Self {
        Self {
            user,
            course,
            lectures: Vec::new(),
            completed: false,
            updated_at: Utc::now(),
        }
    }

    pub fn is_viewed(&self, lecture: LectureId) -> bool {
        self.lectures
            .iter()
            .any(|p| p.lecture_id == lecture && p.viewed)
    }

    /// Set one lecture's flag, adding an entry if the lecture has none
    pub fn set_viewed(&mut self, lecture: LectureId, viewed: bool) {
        match self.lectures.iter_mut().find(|p| p.lecture_id == lecture) {
            Some(entry) => entry.viewed = viewed,
            None => self.lectures.push(LectureProgress {
                lecture_id: lecture,
                viewed,
            }),
        }
    }

    /// Set the flag of every given lecture
    pub fn set_all<'a>(&mut self, lectures: impl IntoIterator<Item = &'a LectureId>, viewed: bool) {
        for lecture in lectures {
            self.set_viewed(*lecture, viewed);
        }
    }

    /// Measure progress against the lectures the course currently reaches
    pub fn summarize(&self, reachable: &HashSet<LectureId>) -> ProgressSummary {
        let viewed: HashSet<_> = self
            .lectures
            .iter()
            .filter(|p| p.viewed && reachable.contains(&p.lecture_id))
            .map(|p| p.lecture_id)
            .collect();

        ProgressSummary::new(viewed.len(), reachable.len())
    }

    /// Recompute and store the completion flag.
    ///
    /// Returns the fresh summary and whether the stored flag changed.
    pub fn refresh_completed(&mut self, reachable: &HashSet<LectureId>) -> (ProgressSummary, bool) {
        let summary = self.summarize(reachable);
        let changed = self.completed != summary.completed;
        self.completed = summary.completed;
        (summary, changed)
    }
}

/// Derived progress figures for one student in one course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub viewed_count: usize,
    pub total_lectures: usize,
    #[serde(rename = "courseProgressPercent")]
    pub percent: u8,
    pub completed: bool,
}

impl ProgressSummary {
    pub fn new(viewed_count: usize, total_lectures: usize) -> Self {
        Self {
            viewed_count,
            total_lectures,
            percent: completion_percent(viewed_count, total_lectures),
            completed: total_lectures > 0 && viewed_count == total_lectures,
        }
    }
}

/// Whole-number percentage of `viewed` over `total`, halves rounded up.
/// An empty course is 0% done.
pub fn completion_percent(viewed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let viewed = viewed.min(total) as u64;
    let total = total as u64;
    ((viewed * 200 + total) / (2 * total)) as u8
}
