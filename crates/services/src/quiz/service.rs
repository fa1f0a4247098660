use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{AttemptId, Difficulty, Question};
use storage::repository::{AttemptRepository, NewAttemptRecord, NewQuestionResultRecord};

use super::flow::{NextOutcome, QuizFlow};
use super::session::QuizSession;
use crate::error::QuizError;
use crate::question_source::QuestionSource;

/// Navigation signal emitted once a finished quiz has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizCompleted {
    pub attempt_id: AttemptId,
    pub correct_answers_count: u32,
    pub total_questions: u32,
}

/// Orchestrates one quiz at a time: fetch, drive the flow, score, persist.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    attempts: Arc<dyn AttemptRepository>,
    batch_size: u8,
    category: u32,
    difficulty: Difficulty,
}

impl QuizService {
    /// Batch size of the base flow.
    pub const DEFAULT_BATCH_SIZE: u8 = 5;
    /// Open Trivia DB category 9, "General Knowledge".
    pub const DEFAULT_CATEGORY: u32 = 9;

    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            source,
            attempts,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            category: Self::DEFAULT_CATEGORY,
            difficulty: Difficulty::Easy,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: u32) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u8) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Start a fresh quiz: enter `Loading`, fetch a batch, resolve the flow.
    ///
    /// Fetch failures land in the flow's `Error` state rather than being
    /// returned; the flow is the single source of truth for what the user
    /// sees next.
    pub async fn start_quiz(&self, flow: &mut QuizFlow) {
        let ticket = flow.start();
        let outcome = self
            .source
            .fetch_questions(self.batch_size, self.category, self.difficulty)
            .await
            .map_err(QuizError::from);
        flow.resolve_fetch(ticket, outcome);
    }

    /// Re-play a past attempt's stored questions instead of fetching new ones.
    pub async fn start_retry(&self, flow: &mut QuizFlow, attempt_id: AttemptId) {
        let ticket = flow.start();
        let outcome = self.replay_questions(attempt_id).await;
        flow.resolve_fetch(ticket, outcome);
    }

    async fn replay_questions(&self, attempt_id: AttemptId) -> Result<Vec<Question>, QuizError> {
        let (attempt, results) = self.attempts.get_attempt_with_results(attempt_id).await?;

        let mut questions = Vec::with_capacity(results.len());
        for result in results {
            questions.push(Question::new(
                result.question_text,
                result.correct_answer,
                result.all_answers,
                attempt.category(),
                attempt.difficulty(),
            )?);
        }
        Ok(questions)
    }

    /// Drive one "next" action; on the final question this scores the
    /// session, persists attempt + results as one unit, and returns the
    /// navigation signal.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` outside `InProgress`, and
    /// propagates persistence failures after moving the flow to `Error`
    /// (the session data is discarded, per the no-partial-result rule).
    pub async fn next(&self, flow: &mut QuizFlow) -> Result<Option<QuizCompleted>, QuizError> {
        match flow.next()? {
            NextOutcome::Advanced => Ok(None),
            NextOutcome::Finished(session) => match self.persist(&session).await {
                Ok(completed) => Ok(Some(completed)),
                Err(err) => {
                    log::error!("failed to persist quiz attempt: {err}");
                    flow.fail(err.to_string());
                    Err(err)
                }
            },
        }
    }

    async fn persist(&self, session: &QuizSession) -> Result<QuizCompleted, QuizError> {
        let correct = session.correct_count();
        let total = u32::try_from(session.total()).unwrap_or(u32::MAX);

        // The session is never empty, so metadata comes from the first question.
        let first = session.questions().first().ok_or(QuizError::EmptyBatch)?;
        let attempt = NewAttemptRecord {
            timestamp: self.clock.now(),
            correct_answers_count: correct,
            total_questions: total,
            category: first.category().to_string(),
            difficulty: first.difficulty(),
        };

        let results: Vec<NewQuestionResultRecord> = session
            .questions()
            .iter()
            .enumerate()
            .map(|(i, q)| NewQuestionResultRecord::from_answer(q, session.answer_for(i)))
            .collect();

        let attempt_id = self.attempts.save_attempt(attempt, results).await?;
        log::debug!("saved attempt {attempt_id} ({correct}/{total})");

        Ok(QuizCompleted {
            attempt_id,
            correct_answers_count: correct,
            total_questions: total,
        })
    }
}
