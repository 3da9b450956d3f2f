//! Pure scoring math for completed attempts and derived percentages.

use crate::model::{Question, QuestionOutcome};

/// Graded result of scoring one answer set against one question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub correct_count: u32,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Grade an answer set against the question list.
///
/// `answers` is positionally parallel to `questions`; `None` marks an
/// unanswered question and is always incorrect. A missing slot (shorter
/// answer list) counts as unanswered rather than faulting. Deterministic:
/// identical input yields identical output.
#[must_use]
pub fn score_answers(answers: &[Option<String>], questions: &[Question]) -> ScoreBreakdown {
    let mut outcomes = Vec::with_capacity(questions.len());
    let mut correct_count = 0_u32;

    for (index, question) in questions.iter().enumerate() {
        let user_answer = answers.get(index).and_then(|a| a.as_deref());
        let is_correct = user_answer == Some(question.correct_answer.as_str());
        if is_correct {
            correct_count += 1;
        }
        outcomes.push(QuestionOutcome {
            question: question.prompt.clone(),
            user_answer: user_answer.map(str::to_owned),
            correct_answer: question.correct_answer.clone(),
            is_correct,
        });
    }

    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    ScoreBreakdown {
        score: percentage(correct_count, total),
        correct_count,
        outcomes,
    }
}

/// Rounded percentage of `part` in `total`, 0 when `total` is 0.
#[must_use]
pub fn percentage(part: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    clamp_percent(f64::from(part) / f64::from(total) * 100.0)
}

/// Round and clamp a raw percentage into 0..=100.
///
/// The clamp also covers counts coerced out of loosely-typed storage, where
/// "part" can legitimately exceed "total".
#[must_use]
pub fn clamp_percent(raw: f64) -> u8 {
    let rounded = raw.round().clamp(0.0, 100.0);
    rounded as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn question(id: u64, prompt: &str, correct: &str) -> Question {
        Question {
            id: QuestionId::new(id),
            prompt: prompt.to_owned(),
            options: vec![correct.to_owned(), "other".to_owned()],
            correct_answer: correct.to_owned(),
        }
    }

    fn three_questions() -> Vec<Question> {
        vec![
            question(1, "What is the past tense of 'go'?", "went"),
            question(2, "Which word is a noun?", "happiness"),
            question(3, "What is the plural form of 'child'?", "children"),
        ]
    }

    #[test]
    fn two_of_three_rounds_to_67() {
        let answers = vec![
            Some("went".to_owned()),
            Some("quickly".to_owned()),
            Some("children".to_owned()),
        ];
        let breakdown = score_answers(&answers, &three_questions());
        assert_eq!(breakdown.correct_count, 2);
        assert_eq!(breakdown.score, 67);
        assert!(breakdown.outcomes[0].is_correct);
        assert!(!breakdown.outcomes[1].is_correct);
        assert!(breakdown.outcomes[2].is_correct);
    }

    #[test]
    fn unanswered_is_incorrect() {
        let answers = vec![None, None, None];
        let breakdown = score_answers(&answers, &three_questions());
        assert_eq!(breakdown.correct_count, 0);
        assert_eq!(breakdown.score, 0);
        assert!(breakdown.outcomes.iter().all(|o| !o.is_correct));
        assert!(breakdown.outcomes.iter().all(|o| o.user_answer.is_none()));
    }

    #[test]
    fn empty_question_list_scores_zero() {
        let breakdown = score_answers(&[], &[]);
        assert_eq!(breakdown.score, 0);
        assert_eq!(breakdown.correct_count, 0);
        assert!(breakdown.outcomes.is_empty());
    }

    #[test]
    fn short_answer_list_treated_as_unanswered() {
        let answers = vec![Some("went".to_owned())];
        let breakdown = score_answers(&answers, &three_questions());
        assert_eq!(breakdown.correct_count, 1);
        assert_eq!(breakdown.outcomes.len(), 3);
        assert_eq!(breakdown.outcomes[2].user_answer, None);
    }

    #[test]
    fn scoring_is_deterministic() {
        let answers = vec![Some("went".to_owned()), None, Some("childs".to_owned())];
        let first = score_answers(&answers, &three_questions());
        let second = score_answers(&answers, &three_questions());
        assert_eq!(first, second);
    }

    #[test]
    fn percentage_guards_zero_total() {
        assert_eq!(percentage(3, 0), 0);
        assert_eq!(percentage(3, 4), 75);
        assert_eq!(percentage(2, 3), 67);
    }

    #[test]
    fn clamp_bounds_malformed_ratios() {
        assert_eq!(clamp_percent(240.0), 100);
        assert_eq!(clamp_percent(-5.0), 0);
        assert_eq!(clamp_percent(66.6), 67);
    }

    // Score law: whatever the counts, the derived score stays in range.
    #[test]
    fn score_never_leaves_range() {
        for part in [0_u32, 1, 3, 10, 500] {
            for total in [0_u32, 1, 3, 7] {
                assert!(percentage(part, total) <= 100);
            }
        }
    }
}
