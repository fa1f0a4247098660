use crate::model::{AttemptId, ResultId};

/// Per-question outcome persisted alongside its parent attempt.
///
/// `all_answers` is the snapshot of the shuffled order shown to the user.
/// An empty `user_answer` means the question was left unanswered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub id: ResultId,
    pub attempt_id: AttemptId,
    pub question_text: String,
    pub all_answers: Vec<String>,
    pub correct_answer: String,
    pub user_answer: String,
    pub was_correct: bool,
}

impl QuestionResult {
    /// Recompute correctness from the stored answers.
    ///
    /// Matches the persisted `was_correct` flag for any record written by
    /// this crate; kept separate so the invariant stays checkable.
    #[must_use]
    pub fn recomputed_correct(&self) -> bool {
        !self.user_answer.is_empty() && self.user_answer == self.correct_answer
    }
}
