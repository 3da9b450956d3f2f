use chrono::{DateTime, Utc};
use std::fmt;

use portal_core::model::{Question, QuizDefinition, ResultRecord, StudentId};
use portal_core::scoring;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Discrete lifecycle of a quiz attempt.
///
/// Transitions run strictly forward: Idle → InProgress → Submitted. A
/// submitted session only goes back to Idle through an explicit `reset`
/// with a new definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    InProgress,
    Submitted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state machine for one timed quiz attempt.
///
/// Holds the answer ledger (positionally parallel to the question list at
/// all times) and the navigation cursor. The cursor and ledger only mutate
/// while InProgress. Time is mirrored in from the owning countdown; the
/// session itself never sleeps.
pub struct QuizSession {
    quiz: QuizDefinition,
    student_id: StudentId,
    current_index: usize,
    answers: Vec<Option<String>>,
    time_remaining_secs: u32,
    phase: SessionPhase,
    record: Option<ResultRecord>,
}

impl QuizSession {
    /// Create an idle session around a definition.
    ///
    /// Nothing is validated yet; validation runs in `start`, so a session
    /// can be constructed around a bad definition but never started.
    #[must_use]
    pub fn new(quiz: QuizDefinition, student_id: StudentId) -> Self {
        let answers = vec![None; quiz.question_count()];
        Self {
            quiz,
            student_id,
            current_index: 0,
            answers,
            time_remaining_secs: 0,
            phase: SessionPhase::Idle,
            record: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    #[must_use]
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.current_index)
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }

    /// Number of questions with a recorded answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.quiz.question_count(),
            answered: self.answered_count(),
            current_index: self.current_index,
            time_remaining_secs: self.time_remaining_secs,
            is_submitted: self.phase == SessionPhase::Submitted,
        }
    }

    /// Validate the definition and begin the attempt.
    ///
    /// Resets the ledger to all-unanswered, moves the cursor to the first
    /// question and returns the countdown duration the caller should arm.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` for an invalid definition (no
    /// partial session is created) and `SessionError::InvalidPhase` when the
    /// session is not Idle.
    pub fn start(&mut self) -> Result<u32, SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::InvalidPhase { phase: self.phase });
        }
        self.quiz.validate()?;

        self.answers = vec![None; self.quiz.question_count()];
        self.current_index = 0;
        self.time_remaining_secs = self.quiz.time_limit_secs;
        self.phase = SessionPhase::InProgress;
        Ok(self.time_remaining_secs)
    }

    /// Reset back to Idle around a new definition, discarding all progress
    /// and any computed record.
    pub fn reset(&mut self, quiz: QuizDefinition) {
        self.answers = vec![None; quiz.question_count()];
        self.quiz = quiz;
        self.current_index = 0;
        self.time_remaining_secs = 0;
        self.phase = SessionPhase::Idle;
        self.record = None;
    }

    /// Record the selected option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the session is InProgress.
    pub fn record_answer(&mut self, option: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.answers[self.current_index] = Some(option.into());
        Ok(())
    }

    /// Move the cursor to the next question.
    ///
    /// Clamps silently at the last question and returns the (possibly
    /// unchanged) cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the session is InProgress.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        if self.current_index + 1 < self.quiz.question_count() {
            self.current_index += 1;
        }
        Ok(self.current_index)
    }

    /// Move the cursor to the previous question.
    ///
    /// Clamps silently at the first question and returns the (possibly
    /// unchanged) cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the session is InProgress.
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self.current_index)
    }

    /// Mirror the countdown's remaining time into the session.
    ///
    /// A no-op outside InProgress: a tick racing a submit must not fault or
    /// disturb terminal state.
    pub fn sync_remaining(&mut self, remaining_secs: u32) {
        if self.phase == SessionPhase::InProgress {
            self.time_remaining_secs = remaining_secs;
        }
    }

    /// Close the attempt and derive its result record.
    ///
    /// Idempotent once submitted: repeat calls return the already-computed
    /// record without rescoring. An Idle session cannot submit; InProgress
    /// is never skipped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` if the session was never started.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<ResultRecord, SessionError> {
        if let Some(record) = &self.record {
            return Ok(record.clone());
        }
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::InvalidPhase { phase: self.phase });
        }

        let breakdown = scoring::score_answers(&self.answers, &self.quiz.questions);
        let record = ResultRecord {
            student_id: self.student_id.clone(),
            quiz_id: self.quiz.id.clone(),
            subject: self.quiz.subject.clone(),
            level: self.quiz.level.clone(),
            score: breakdown.score,
            correct_answers: breakdown.correct_count,
            total_questions: u32::try_from(self.quiz.question_count()).unwrap_or(u32::MAX),
            timestamp: now,
            results: breakdown.outcomes,
        };
        self.phase = SessionPhase::Submitted;
        self.record = Some(record.clone());
        Ok(record)
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::InProgress {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase { phase: self.phase })
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id)
            .field("phase", &self.phase)
            .field("current_index", &self.current_index)
            .field("answered", &self.answered_count())
            .field("time_remaining_secs", &self.time_remaining_secs)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
