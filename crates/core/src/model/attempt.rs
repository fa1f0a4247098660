use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AttemptId, Difficulty};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("an attempt must contain at least one question")]
    NoQuestions,

    #[error("correct count ({correct}) exceeds total questions ({total})")]
    CountExceedsTotal { correct: u32, total: u32 },

    #[error("attempt lists {expected} questions but {got} results are attached")]
    ResultCountMismatch { expected: u32, got: u32 },

    #[error("recorded correct count ({recorded}) does not match results ({recomputed})")]
    CorrectCountMismatch { recorded: u32, recomputed: u32 },
}

/// Aggregate record of one completed quiz session.
///
/// Created exactly once at quiz completion and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    id: AttemptId,
    timestamp: DateTime<Utc>,
    correct_answers_count: u32,
    total_questions: u32,
    category: String,
    difficulty: Difficulty,
}

impl QuizAttempt {
    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NoQuestions` for a zero-question attempt and
    /// `AttemptError::CountExceedsTotal` if the score is out of range.
    pub fn from_persisted(
        id: AttemptId,
        timestamp: DateTime<Utc>,
        correct_answers_count: u32,
        total_questions: u32,
        category: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, AttemptError> {
        if total_questions == 0 {
            return Err(AttemptError::NoQuestions);
        }
        if correct_answers_count > total_questions {
            return Err(AttemptError::CountExceedsTotal {
                correct: correct_answers_count,
                total: total_questions,
            });
        }

        Ok(Self {
            id,
            timestamp,
            correct_answers_count,
            total_questions,
            category: category.into(),
            difficulty,
        })
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn correct_answers_count(&self) -> u32 {
        self.correct_answers_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The "correct/total" label shown in list views.
    #[must_use]
    pub fn score_label(&self) -> String {
        format!("{}/{}", self.correct_answers_count, self.total_questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn attempt_validates_score_range() {
        let attempt = QuizAttempt::from_persisted(
            AttemptId::new(1),
            fixed_now(),
            3,
            5,
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap();
        assert_eq!(attempt.score_label(), "3/5");

        let err = QuizAttempt::from_persisted(
            AttemptId::new(2),
            fixed_now(),
            6,
            5,
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AttemptError::CountExceedsTotal { correct: 6, total: 5 }
        ));
    }

    #[test]
    fn attempt_rejects_zero_questions() {
        let err = QuizAttempt::from_persisted(
            AttemptId::new(1),
            fixed_now(),
            0,
            0,
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert!(matches!(err, AttemptError::NoQuestions));
    }
}
