use portal_core::model::{Question, QuestionId, QuizDefinition, QuizError, QuizId, StudentId};
use portal_core::time::fixed_clock;
use services::{ChangeEvent, ChangeNotifier, QuizRunner, SessionError, SessionPhase};
use storage::Storage;

fn question(id: u64, prompt: &str, correct: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        prompt: prompt.to_owned(),
        options: vec![correct.to_owned(), "other".to_owned()],
        correct_answer: correct.to_owned(),
    }
}

fn english_quiz(time_limit_secs: u32) -> QuizDefinition {
    QuizDefinition {
        id: QuizId::new("1"),
        title: "English - Std 5 - Beginner".to_owned(),
        subject: "English".to_owned(),
        level: "Std 5 - Beginner".to_owned(),
        time_limit_secs,
        questions: vec![
            question(1, "What is the past tense of 'go'?", "went"),
            question(2, "Which word is a noun?", "happiness"),
            question(3, "What is the plural form of 'child'?", "children"),
        ],
    }
}

#[tokio::test(start_paused = true)]
async fn explicit_submit_persists_and_notifies() {
    let storage = Storage::in_memory();
    let notifier = ChangeNotifier::new();
    let mut changes = notifier.subscribe();
    let runner = QuizRunner::new(fixed_clock(), storage.results(), notifier.clone());

    let mut active = runner
        .begin(english_quiz(600), StudentId::new("1"))
        .unwrap();
    active.record_answer("went").unwrap();
    active.next().unwrap();
    active.next().unwrap();
    active.record_answer("children").unwrap();

    let record = active.submit().await.unwrap();
    assert_eq!(record.correct_answers, 2);
    assert_eq!(record.score, 67);
    assert_eq!(record.results[1].user_answer, None);
    assert!(!record.results[1].is_correct);

    let persisted = storage.results().read_all().await.unwrap();
    assert_eq!(persisted, vec![record.clone()]);

    assert_eq!(
        changes.recv().await.unwrap(),
        ChangeEvent::KeyChanged("quizResults".to_owned())
    );

    // Submitting again returns the same record without a second append.
    let again = active.submit().await.unwrap();
    assert_eq!(again, record);
    assert_eq!(storage.results().read_all().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn expiry_auto_submits_exactly_once() {
    let storage = Storage::in_memory();
    let notifier = ChangeNotifier::new();
    let runner = QuizRunner::new(fixed_clock(), storage.results(), notifier);

    let mut active = runner.begin(english_quiz(2), StudentId::new("1")).unwrap();
    active.record_answer("went").unwrap();

    let record = active.finished().await.expect("auto-submitted on expiry");
    assert_eq!(record.correct_answers, 1);
    assert_eq!(record.score, 33);

    assert_eq!(storage.results().read_all().await.unwrap().len(), 1);
    assert_eq!(active.phase().unwrap(), SessionPhase::Submitted);

    // Terminal: no further mutation, and an explicit submit after the
    // timeout does not append a second record.
    assert!(matches!(
        active.record_answer("gone"),
        Err(SessionError::InvalidPhase { .. })
    ));
    let again = active.submit().await.unwrap();
    assert_eq!(again, record);
    assert_eq!(storage.results().read_all().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn ticks_mirror_into_the_session() {
    let storage = Storage::in_memory();
    let runner = QuizRunner::new(fixed_clock(), storage.results(), ChangeNotifier::new());

    let active = runner
        .begin(english_quiz(600), StudentId::new("1"))
        .unwrap();
    assert_eq!(active.time_remaining_secs().unwrap(), 600);

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    tokio::task::yield_now().await;
    let remaining = active.time_remaining_secs().unwrap();
    assert!(remaining < 600, "countdown should have ticked");
}

#[tokio::test(start_paused = true)]
async fn zero_question_quiz_never_starts() {
    let storage = Storage::in_memory();
    let runner = QuizRunner::new(fixed_clock(), storage.results(), ChangeNotifier::new());

    let mut quiz = english_quiz(600);
    quiz.questions.clear();
    let err = runner.begin(quiz, StudentId::new("1")).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Configuration(QuizError::NoQuestions)
    ));
    assert!(storage.results().read_all().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn abandoned_attempt_never_auto_submits() {
    let storage = Storage::in_memory();
    let runner = QuizRunner::new(fixed_clock(), storage.results(), ChangeNotifier::new());

    let mut active = runner.begin(english_quiz(2), StudentId::new("1")).unwrap();
    active.abandon();

    // Give the (cancelled) countdown far more than its duration.
    tokio::time::sleep(std::time::Duration::from_secs(10)).await;
    tokio::task::yield_now().await;

    assert_eq!(active.phase().unwrap(), SessionPhase::InProgress);
    assert!(storage.results().read_all().await.unwrap().is_empty());
}
