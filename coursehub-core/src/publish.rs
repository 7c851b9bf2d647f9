//! Publish-eligibility rule
//!
//! A course may be published only when it reaches at least one lecture and
//! every reachable lecture has either a video or a quiz question.
//! Unpublishing is always allowed.

use serde::Serialize;
use thiserror::Error;

use crate::ids::LectureId;
use crate::outline::CourseOutline;

/// A lecture that blocks publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteLecture {
    pub id: LectureId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("A course needs at least one lecture before it can be published")]
    NoLectures,

    #[error("Every lecture needs a video or a quiz before publishing. Incomplete: {}", join_titles(.0))]
    IncompleteLectures(Vec<IncompleteLecture>),
}

fn join_titles(lectures: &[IncompleteLecture]) -> String {
    lectures
        .iter()
        .map(|l| l.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lectures without a video and without quiz questions, in outline order
pub fn incomplete_lectures(outline: &CourseOutline) -> Vec<IncompleteLecture> {
    outline
        .lectures()
        .filter(|l| !l.is_complete())
        .map(|l| IncompleteLecture {
            id: l.id,
            title: l.title.clone(),
        })
        .collect()
}

/// Decide whether a course may move to the requested publish state
pub fn check_publish(outline: &CourseOutline, publish: bool) -> Result<(), PublishError> {
    if !publish {
        return Ok(());
    }
    if outline.is_empty() {
        return Err(PublishError::NoLectures);
    }

    let incomplete = incomplete_lectures(outline);
    if !incomplete.is_empty() {
        return Err(PublishError::IncompleteLectures(incomplete));
    }

    Ok(())
}
