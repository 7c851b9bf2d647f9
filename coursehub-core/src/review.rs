//! Course reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{CourseId, ReviewId, UserId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub course: CourseId,
    pub user: UserId,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("Rating must be between {MIN_RATING} and {MAX_RATING}")]
    RatingOutOfRange,

    #[error("Comment must be at most {MAX_COMMENT_CHARS} characters")]
    CommentTooLong,
}

impl Review {
    /// Build a review from user input, trimming the comment
    pub fn new(course: CourseId, user: UserId, rating: i64, comment: &str) -> Result<Self, ReviewError> {
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or(ReviewError::RatingOutOfRange)?;

        let comment = comment.trim();
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(ReviewError::CommentTooLong);
        }

        Ok(Self {
            id: ReviewId::new(),
            course,
            user,
            rating,
            comment: comment.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Mean rating, or `None` when there are no reviews
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    Some(f64::from(sum) / reviews.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let (c, u) = (CourseId::new(), UserId::new());
        assert_eq!(Review::new(c, u, 0, "").unwrap_err(), ReviewError::RatingOutOfRange);
        assert_eq!(Review::new(c, u, 6, "").unwrap_err(), ReviewError::RatingOutOfRange);
        assert_eq!(Review::new(c, u, -3, "").unwrap_err(), ReviewError::RatingOutOfRange);
        assert_eq!(Review::new(c, u, 5, "  great  ").unwrap().comment, "great");
    }

    #[test]
    fn test_comment_limit_counts_chars() {
        let (c, u) = (CourseId::new(), UserId::new());
        let at_limit = "é".repeat(MAX_COMMENT_CHARS);
        assert!(Review::new(c, u, 4, &at_limit).is_ok());

        let over = "a".repeat(MAX_COMMENT_CHARS + 1);
        assert_eq!(Review::new(c, u, 4, &over).unwrap_err(), ReviewError::CommentTooLong);
    }

    #[test]
    fn test_average_rating() {
        let (c, u) = (CourseId::new(), UserId::new());
        assert_eq!(average_rating(&[]), None);

        let reviews = vec![
            Review::new(c, u, 5, "").unwrap(),
            Review::new(c, UserId::new(), 2, "").unwrap(),
        ];
        assert_eq!(average_rating(&reviews), Some(3.5));
    }
}
