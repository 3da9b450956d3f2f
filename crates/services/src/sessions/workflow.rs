use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};

use portal_core::Clock;
use portal_core::model::{Question, QuizDefinition, ResultRecord, StudentId};
use storage::{RESULTS_KEY, ResultsStore};

use super::progress::SessionProgress;
use super::session::{QuizSession, SessionPhase};
use crate::countdown::{Countdown, TickEvent};
use crate::error::SessionError;
use crate::notify::ChangeNotifier;

/// Orchestrates timed attempts end to end: countdown wiring, submission,
/// persistence and change signaling.
#[derive(Clone)]
pub struct QuizRunner {
    clock: Clock,
    results: ResultsStore,
    notifier: ChangeNotifier,
}

impl QuizRunner {
    #[must_use]
    pub fn new(clock: Clock, results: ResultsStore, notifier: ChangeNotifier) -> Self {
        Self {
            clock,
            results,
            notifier,
        }
    }

    /// Start a timed attempt for the given quiz and student.
    ///
    /// Validates the definition, arms a countdown with the quiz time limit
    /// and spawns a driver that mirrors ticks into the session and submits
    /// on expiry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` if the definition fails
    /// validation; nothing is armed in that case.
    pub fn begin(
        &self,
        quiz: QuizDefinition,
        student: StudentId,
    ) -> Result<ActiveQuiz, SessionError> {
        let mut session = QuizSession::new(quiz, student);
        let duration_secs = session.start()?;

        let session = Arc::new(Mutex::new(session));
        let final_tx = Arc::new(watch::channel(None).0);
        let final_rx = final_tx.subscribe();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new();
        countdown.arm(duration_secs, move |event| {
            let _ = event_tx.send(event);
        });

        tokio::spawn(drive(
            event_rx,
            Arc::clone(&session),
            self.clone(),
            Arc::clone(&final_tx),
        ));

        Ok(ActiveQuiz {
            session,
            countdown,
            runner: self.clone(),
            final_tx,
            final_rx,
        })
    }
}

/// A running (or just-finished) attempt handed out by [`QuizRunner::begin`].
///
/// Dropping it cancels the countdown; an abandoned attempt never
/// auto-submits afterwards.
pub struct ActiveQuiz {
    session: Arc<Mutex<QuizSession>>,
    countdown: Countdown,
    runner: QuizRunner,
    final_tx: Arc<watch::Sender<Option<ResultRecord>>>,
    final_rx: watch::Receiver<Option<ResultRecord>>,
}

impl std::fmt::Debug for ActiveQuiz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveQuiz").finish_non_exhaustive()
    }
}

impl ActiveQuiz {
    /// Record the selected option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` once the attempt is submitted.
    pub fn record_answer(&self, option: impl Into<String>) -> Result<(), SessionError> {
        self.lock()?.record_answer(option)
    }

    /// Move to the next question (clamps silently at the last).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` once the attempt is submitted.
    pub fn next(&self) -> Result<usize, SessionError> {
        self.lock()?.next()
    }

    /// Move to the previous question (clamps silently at the first).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` once the attempt is submitted.
    pub fn previous(&self) -> Result<usize, SessionError> {
        self.lock()?.previous()
    }

    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the session lock is poisoned.
    pub fn phase(&self) -> Result<SessionPhase, SessionError> {
        Ok(self.lock()?.phase())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the session lock is poisoned.
    pub fn current_question(&self) -> Result<Option<Question>, SessionError> {
        Ok(self.lock()?.current_question().cloned())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the session lock is poisoned.
    pub fn progress(&self) -> Result<SessionProgress, SessionError> {
        Ok(self.lock()?.progress())
    }

    /// Remaining time as of the last countdown tick.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the session lock is poisoned.
    pub fn time_remaining_secs(&self) -> Result<u32, SessionError> {
        Ok(self.lock()?.time_remaining_secs())
    }

    /// Submit now: cancel the countdown, close the session, persist the
    /// record and signal the change.
    ///
    /// Idempotent; repeat calls (or a call racing the timeout path) return
    /// the already-computed record without appending twice.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` for a never-started session and
    /// store errors from the append.
    pub async fn submit(&mut self) -> Result<ResultRecord, SessionError> {
        self.countdown.cancel();
        finish(&self.session, &self.runner, &self.final_tx).await
    }

    /// Resolves once the attempt has been submitted, explicitly or by
    /// expiry, with the persisted record. Returns `None` if the attempt was
    /// torn down without ever submitting.
    pub async fn finished(&mut self) -> Option<ResultRecord> {
        if let Some(record) = self.final_rx.borrow().clone() {
            return Some(record);
        }
        while self.final_rx.changed().await.is_ok() {
            if let Some(record) = self.final_rx.borrow().clone() {
                return Some(record);
            }
        }
        None
    }

    /// Tear down without submitting. The countdown stops firing; the
    /// session stays wherever it was.
    pub fn abandon(&mut self) {
        self.countdown.cancel();
    }

    fn lock(&self) -> Result<MutexGuard<'_, QuizSession>, SessionError> {
        self.session.lock().map_err(|_| SessionError::Poisoned)
    }
}

/// Close the session (if not already closed) and, for the call that actually
/// performed the transition, append the record and fire the change signal.
async fn finish(
    session: &Arc<Mutex<QuizSession>>,
    runner: &QuizRunner,
    final_tx: &watch::Sender<Option<ResultRecord>>,
) -> Result<ResultRecord, SessionError> {
    let (record, fresh) = {
        let mut guard = session.lock().map_err(|_| SessionError::Poisoned)?;
        let fresh = guard.phase() != SessionPhase::Submitted;
        let record = guard.submit(runner.clock.now())?;
        (record, fresh)
    };

    if fresh {
        runner.results.append(&record).await?;
        runner.notifier.key_changed(RESULTS_KEY);
        let _ = final_tx.send(Some(record.clone()));
    }
    Ok(record)
}

/// Translate countdown events into session updates; exactly one submit on
/// expiry.
async fn drive(
    mut events: mpsc::UnboundedReceiver<TickEvent>,
    session: Arc<Mutex<QuizSession>>,
    runner: QuizRunner,
    final_tx: Arc<watch::Sender<Option<ResultRecord>>>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TickEvent::Tick { remaining_secs } => {
                if let Ok(mut guard) = session.lock() {
                    guard.sync_remaining(remaining_secs);
                }
            }
            TickEvent::Expired => {
                if let Err(err) = finish(&session, &runner, &final_tx).await {
                    tracing::warn!(error = %err, "auto-submit on expiry failed");
                }
                break;
            }
        }
    }
}
