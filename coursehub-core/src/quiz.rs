//! Lecture quizzes and their write-time validation
//!
//! Quizzes are scored by the client; the server only guarantees that every
//! stored question is answerable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of options a question must offer
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Signed so that negative input is rejected by validation rather than
    /// by the JSON decoder
    pub correct_option_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("Quiz must contain at least one question")]
    NoQuestions,

    #[error("Question {number}: question text is required")]
    MissingQuestionText { number: usize },

    #[error("Question {number}: at least {MIN_OPTIONS} options are required")]
    TooFewOptions { number: usize },

    #[error("Question {number}: correct option index {index} is out of range for {options} options")]
    CorrectOptionOutOfRange {
        number: usize,
        index: i64,
        options: usize,
    },
}

/// Check every question of a quiz; the first violation rejects the whole quiz
pub fn validate_quiz(quiz: &Quiz) -> Result<(), QuizError> {
    if quiz.questions.is_empty() {
        return Err(QuizError::NoQuestions);
    }

    for (i, q) in quiz.questions.iter().enumerate() {
        let number = i + 1;

        if q.question.trim().is_empty() {
            return Err(QuizError::MissingQuestionText { number });
        }
        if q.options.len() < MIN_OPTIONS {
            return Err(QuizError::TooFewOptions { number });
        }
        let in_range = usize::try_from(q.correct_option_index)
            .map(|idx| idx < q.options.len())
            .unwrap_or(false);
        if !in_range {
            return Err(QuizError::CorrectOptionOutOfRange {
                number,
                index: q.correct_option_index,
                options: q.options.len(),
            });
        }
    }

    Ok(())
}
