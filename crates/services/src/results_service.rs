use std::sync::Arc;

use quiz_core::model::{AttemptId, QuizAttempt, QuizReview};
use quiz_core::score::result_message;
use storage::repository::AttemptRepository;

use crate::error::ResultsError;
use crate::quiz::QuizCompleted;

/// Render-facing state of the results screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsState {
    pub correct_answers_count: u32,
    pub total_questions: u32,
    pub result_title: String,
    pub result_subtitle: String,
    pub review_visible: bool,
    pub review: Option<QuizReview>,
}

/// Presents a completed attempt: score message plus the on-demand review.
///
/// The review is fetched at most once per service instance; after that,
/// toggling only flips visibility.
pub struct ResultsService {
    attempts: Arc<dyn AttemptRepository>,
    attempt_id: Option<AttemptId>,
    state: ResultsState,
}

impl ResultsService {
    /// Results view for a quiz that just finished and was saved.
    #[must_use]
    pub fn from_completed(attempts: Arc<dyn AttemptRepository>, completed: QuizCompleted) -> Self {
        Self::build(
            attempts,
            Some(completed.attempt_id),
            completed.correct_answers_count,
            completed.total_questions,
        )
    }

    /// Results view for a stored attempt opened from history.
    #[must_use]
    pub fn from_attempt(attempts: Arc<dyn AttemptRepository>, attempt: &QuizAttempt) -> Self {
        Self::build(
            attempts,
            Some(attempt.id()),
            attempt.correct_answers_count(),
            attempt.total_questions(),
        )
    }

    /// Results view with no backing attempt; toggling the review is a no-op.
    #[must_use]
    pub fn detached(attempts: Arc<dyn AttemptRepository>, correct: u32, total: u32) -> Self {
        Self::build(attempts, None, correct, total)
    }

    fn build(
        attempts: Arc<dyn AttemptRepository>,
        attempt_id: Option<AttemptId>,
        correct: u32,
        total: u32,
    ) -> Self {
        let text = result_message(correct, total);
        Self {
            attempts,
            attempt_id,
            state: ResultsState {
                correct_answers_count: correct,
                total_questions: total,
                result_title: text.title.to_string(),
                result_subtitle: text.subtitle,
                review_visible: false,
                review: None,
            },
        }
    }

    #[must_use]
    pub fn state(&self) -> &ResultsState {
        &self.state
    }

    /// Flip review visibility; the first toggle-on loads and caches the
    /// review, later toggles reuse it. Without an attempt id this does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError` if loading or assembling the review fails;
    /// visibility is left unchanged in that case.
    pub async fn toggle_review(&mut self) -> Result<(), ResultsError> {
        let Some(attempt_id) = self.attempt_id else {
            return Ok(());
        };

        if !self.state.review_visible && self.state.review.is_none() {
            let (attempt, results) = self.attempts.get_attempt_with_results(attempt_id).await?;
            self.state.review = Some(QuizReview::from_parts(&attempt, &results)?);
        }

        self.state.review_visible = !self.state.review_visible;
        Ok(())
    }
}
