use chrono::{DateTime, Utc};

use crate::model::{AttemptError, AttemptId, Difficulty, QuestionResult, QuizAttempt};

/// List-view projection of a stored attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizHistoryItem {
    pub id: AttemptId,
    pub timestamp: DateTime<Utc>,
    pub score: String,
    pub category: String,
    pub difficulty: Difficulty,
}

impl QuizHistoryItem {
    #[must_use]
    pub fn from_attempt(attempt: &QuizAttempt) -> Self {
        Self {
            id: attempt.id(),
            timestamp: attempt.timestamp(),
            score: attempt.score_label(),
            category: attempt.category().to_string(),
            difficulty: attempt.difficulty(),
        }
    }
}

/// One question of a past attempt with the user's answer marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewedQuestion {
    pub question_text: String,
    pub all_answers: Vec<String>,
    pub correct_answer: String,
    pub user_answer: String,
    pub was_correct: bool,
}

impl ReviewedQuestion {
    #[must_use]
    pub fn from_result(result: &QuestionResult) -> Self {
        Self {
            question_text: result.question_text.clone(),
            all_answers: result.all_answers.clone(),
            correct_answer: result.correct_answer.clone(),
            user_answer: result.user_answer.clone(),
            was_correct: result.was_correct,
        }
    }
}

/// Detailed breakdown of a past attempt, assembled on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReview {
    pub category: String,
    pub difficulty: Difficulty,
    pub questions: Vec<ReviewedQuestion>,
}

impl QuizReview {
    /// Assemble a review from an attempt and its stored results.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ResultCountMismatch` if the result count does
    /// not match `total_questions`, and `AttemptError::CorrectCountMismatch`
    /// if the recorded score disagrees with the `was_correct` flags.
    pub fn from_parts(
        attempt: &QuizAttempt,
        results: &[QuestionResult],
    ) -> Result<Self, AttemptError> {
        let got = u32::try_from(results.len()).unwrap_or(u32::MAX);
        if got != attempt.total_questions() {
            return Err(AttemptError::ResultCountMismatch {
                expected: attempt.total_questions(),
                got,
            });
        }

        let recomputed = u32::try_from(results.iter().filter(|r| r.was_correct).count())
            .unwrap_or(u32::MAX);
        if recomputed != attempt.correct_answers_count() {
            return Err(AttemptError::CorrectCountMismatch {
                recorded: attempt.correct_answers_count(),
                recomputed,
            });
        }

        Ok(Self {
            category: attempt.category().to_string(),
            difficulty: attempt.difficulty(),
            questions: results.iter().map(ReviewedQuestion::from_result).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultId;
    use crate::time::fixed_now;

    fn attempt(correct: u32, total: u32) -> QuizAttempt {
        QuizAttempt::from_persisted(
            AttemptId::new(7),
            fixed_now(),
            correct,
            total,
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap()
    }

    fn stored_result(id: u64, user_answer: &str, was_correct: bool) -> QuestionResult {
        QuestionResult {
            id: ResultId::new(id),
            attempt_id: AttemptId::new(7),
            question_text: format!("Q{id}"),
            all_answers: vec!["A".to_string(), "B".to_string()],
            correct_answer: "A".to_string(),
            user_answer: user_answer.to_string(),
            was_correct,
        }
    }

    #[test]
    fn history_item_carries_score_label() {
        let item = QuizHistoryItem::from_attempt(&attempt(4, 5));
        assert_eq!(item.score, "4/5");
        assert_eq!(item.id, AttemptId::new(7));
    }

    #[test]
    fn review_preserves_result_order() {
        let results = vec![
            stored_result(1, "A", true),
            stored_result(2, "B", false),
            stored_result(3, "", false),
        ];
        let review = QuizReview::from_parts(&attempt(1, 3), &results).unwrap();
        assert_eq!(review.questions.len(), 3);
        assert_eq!(review.questions[0].user_answer, "A");
        assert!(review.questions[0].was_correct);
        assert_eq!(review.questions[2].user_answer, "");
        assert!(!review.questions[2].was_correct);
    }

    #[test]
    fn review_rejects_result_count_mismatch() {
        let results = vec![stored_result(1, "A", true)];
        let err = QuizReview::from_parts(&attempt(1, 3), &results).unwrap_err();
        assert!(matches!(
            err,
            AttemptError::ResultCountMismatch { expected: 3, got: 1 }
        ));
    }

    #[test]
    fn review_rejects_score_mismatch() {
        let results = vec![stored_result(1, "A", true), stored_result(2, "A", true)];
        let err = QuizReview::from_parts(&attempt(1, 2), &results).unwrap_err();
        assert!(matches!(
            err,
            AttemptError::CorrectCountMismatch {
                recorded: 1,
                recomputed: 2
            }
        ));
    }
}
