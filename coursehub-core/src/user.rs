//! User accounts as seen by the course service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    pub enrolled_courses: Vec<CourseId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into().to_lowercase(),
            password_hash: None,
            google_id: None,
            enrolled_courses: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a course to the enrolled list; returns `false` if already there
    pub fn enroll(&mut self, course: CourseId) -> bool {
        if self.enrolled_courses.contains(&course) {
            return false;
        }
        self.enrolled_courses.push(course);
        true
    }
}
