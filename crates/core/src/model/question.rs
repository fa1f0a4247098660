use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("a question needs at least two answer options, got {len}")]
    TooFewAnswers { len: usize },

    #[error("correct answer must appear exactly once among the options, found {count} times")]
    CorrectAnswerCount { count: usize },
}

/// Requested difficulty of a trivia batch, lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDifficultyError {
    raw: String,
}

impl fmt::Display for ParseDifficultyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown difficulty: {}", self.raw)
    }
}

impl std::error::Error for ParseDifficultyError {}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError {
                raw: other.to_string(),
            }),
        }
    }
}

/// One trivia question as shown to the user.
///
/// The answer order is randomized at fetch time and never reshuffled, so the
/// snapshot persisted with an attempt matches what was on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    question_text: String,
    correct_answer: String,
    all_shuffled_answers: Vec<String>,
    category: String,
    difficulty: Difficulty,
}

impl Question {
    /// Build a question, validating the answer set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TooFewAnswers` for fewer than two options and
    /// `QuestionError::CorrectAnswerCount` when the correct answer is missing
    /// from the options or listed more than once.
    pub fn new(
        question_text: impl Into<String>,
        correct_answer: impl Into<String>,
        all_shuffled_answers: Vec<String>,
        category: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let correct_answer = correct_answer.into();
        if all_shuffled_answers.len() < 2 {
            return Err(QuestionError::TooFewAnswers {
                len: all_shuffled_answers.len(),
            });
        }
        let count = all_shuffled_answers
            .iter()
            .filter(|a| **a == correct_answer)
            .count();
        if count != 1 {
            return Err(QuestionError::CorrectAnswerCount { count });
        }

        Ok(Self {
            question_text: question_text.into(),
            correct_answer,
            all_shuffled_answers,
            category: category.into(),
            difficulty,
        })
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn all_shuffled_answers(&self) -> &[String] {
        &self.all_shuffled_answers
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// True if the given answer matches the correct one.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn question_validates_answer_set() {
        let q = Question::new(
            "Capital of France?",
            "Paris",
            options(&["Lyon", "Paris", "Nice", "Lille"]),
            "Geography",
            Difficulty::Easy,
        )
        .unwrap();
        assert!(q.is_correct("Paris"));
        assert!(!q.is_correct("Lyon"));
    }

    #[test]
    fn question_rejects_single_option() {
        let err = Question::new(
            "Q",
            "A",
            options(&["A"]),
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::TooFewAnswers { len: 1 }));
    }

    #[test]
    fn question_rejects_missing_correct_answer() {
        let err = Question::new(
            "Q",
            "A",
            options(&["B", "C"]),
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::CorrectAnswerCount { count: 0 }));
    }

    #[test]
    fn question_rejects_duplicated_correct_answer() {
        let err = Question::new(
            "Q",
            "A",
            options(&["A", "A", "B"]),
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::CorrectAnswerCount { count: 2 }));
    }

    #[test]
    fn difficulty_roundtrips_through_str() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert!("impossible".parse::<Difficulty>().is_err());
    }
}
