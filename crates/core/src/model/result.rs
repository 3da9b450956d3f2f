use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuizId, StudentId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultRecordError {
    #[error("result record has zero questions")]
    ZeroQuestions,

    #[error("score {score} is outside 0..=100")]
    ScoreOutOfRange { score: u8 },
}

/// Graded outcome for one question of a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// The immutable outcome of one completed quiz attempt.
///
/// Serialized with the legacy camelCase names so entries interleave cleanly
/// with records written by earlier portal revisions under the same key.
/// Owned exclusively by the results store once appended: never edited,
/// never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub student_id: StudentId,
    pub quiz_id: QuizId,
    pub subject: String,
    pub level: String,
    pub score: u8,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<QuestionOutcome>,
}

impl ResultRecord {
    /// Check the invariants the results store enforces on append.
    ///
    /// # Errors
    ///
    /// Returns `ResultRecordError` if the record covers zero questions or
    /// carries a score above 100.
    pub fn validate(&self) -> Result<(), ResultRecordError> {
        if self.total_questions == 0 {
            return Err(ResultRecordError::ZeroQuestions);
        }
        if self.score > 100 {
            return Err(ResultRecordError::ScoreOutOfRange { score: self.score });
        }
        Ok(())
    }
}
