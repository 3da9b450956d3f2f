use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};

//
// ─── QUIZ TYPES ────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Serialized with the legacy wire names (`text`, `correctAnswer`) so quiz
/// payloads written by earlier portal revisions keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "text")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

/// A timed assessment, immutable once loaded into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub id: QuizId,
    pub title: String,
    pub subject: String,
    pub level: String,
    #[serde(rename = "timeLimit")]
    pub time_limit_secs: u32,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    /// Number of questions in this quiz.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Check that the definition can back a session.
    ///
    /// A session is never started around an invalid definition; callers run
    /// this before arming any timer so no partial session is created.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for an empty question list, a zero time limit, or
    /// a question missing its prompt, options or correct answer.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if self.time_limit_secs == 0 {
            return Err(QuizError::ZeroTimeLimit);
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.prompt.trim().is_empty() {
                return Err(QuizError::EmptyPrompt { index });
            }
            if question.options.is_empty() {
                return Err(QuizError::NoOptions { index });
            }
            if question.correct_answer.trim().is_empty() {
                return Err(QuizError::MissingCorrectAnswer { index });
            }
        }
        Ok(())
    }
}

//
// ─── QUIZ VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("quiz time limit must be greater than zero")]
    ZeroTimeLimit,

    #[error("question {index} has an empty prompt")]
    EmptyPrompt { index: usize },

    #[error("question {index} has no options")]
    NoOptions { index: usize },

    #[error("question {index} has no correct answer")]
    MissingCorrectAnswer { index: usize },
}
