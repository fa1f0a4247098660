use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AttemptId, Difficulty, Question, QuestionResult, QuizAttempt, ResultId,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Attempt row to insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub correct_answers_count: u32,
    pub total_questions: u32,
    pub category: String,
    pub difficulty: Difficulty,
}

/// Per-question result row to insert alongside its attempt.
#[derive(Debug, Clone)]
pub struct NewQuestionResultRecord {
    pub question_text: String,
    pub all_answers: Vec<String>,
    pub correct_answer: String,
    pub user_answer: String,
    pub was_correct: bool,
}

impl NewQuestionResultRecord {
    /// Snapshot a question together with the user's answer.
    ///
    /// An empty `user_answer` encodes "unanswered" and is never correct.
    #[must_use]
    pub fn from_answer(question: &Question, user_answer: &str) -> Self {
        Self {
            question_text: question.question_text().to_string(),
            all_answers: question.all_shuffled_answers().to_vec(),
            correct_answer: question.correct_answer().to_string(),
            user_answer: user_answer.to_string(),
            was_correct: !user_answer.is_empty() && question.is_correct(user_answer),
        }
    }
}

/// Repository contract for quiz attempts and their per-question results.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Persist an attempt and all of its results as one atomic unit.
    ///
    /// Readers never observe the attempt without its results or vice versa.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write cannot be completed; nothing is
    /// persisted in that case.
    async fn save_attempt(
        &self,
        attempt: NewAttemptRecord,
        results: Vec<NewQuestionResultRecord>,
    ) -> Result<AttemptId, StorageError>;

    /// List all attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_attempts(&self) -> Result<Vec<QuizAttempt>, StorageError>;

    /// Fetch a single attempt by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_attempt(&self, id: AttemptId) -> Result<QuizAttempt, StorageError>;

    /// Fetch an attempt together with its results in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_attempt_with_results(
        &self,
        id: AttemptId,
    ) -> Result<(QuizAttempt, Vec<QuestionResult>), StorageError>;

    /// Delete an attempt and its results. Deleting a missing id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on write failures.
    async fn delete_attempt(&self, id: AttemptId) -> Result<(), StorageError>;
}

#[derive(Default)]
struct InMemoryInner {
    next_attempt_id: u64,
    next_result_id: u64,
    attempts: Vec<(QuizAttempt, Vec<QuestionResult>)>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<InMemoryInner>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn save_attempt(
        &self,
        attempt: NewAttemptRecord,
        results: Vec<NewQuestionResultRecord>,
    ) -> Result<AttemptId, StorageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        guard.next_attempt_id += 1;
        let attempt_id = AttemptId::new(guard.next_attempt_id);
        let stored = QuizAttempt::from_persisted(
            attempt_id,
            attempt.timestamp,
            attempt.correct_answers_count,
            attempt.total_questions,
            attempt.category,
            attempt.difficulty,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut stored_results = Vec::with_capacity(results.len());
        for record in results {
            guard.next_result_id += 1;
            stored_results.push(QuestionResult {
                id: ResultId::new(guard.next_result_id),
                attempt_id,
                question_text: record.question_text,
                all_answers: record.all_answers,
                correct_answer: record.correct_answer,
                user_answer: record.user_answer,
                was_correct: record.was_correct,
            });
        }

        guard.attempts.push((stored, stored_results));
        Ok(attempt_id)
    }

    async fn list_attempts(&self) -> Result<Vec<QuizAttempt>, StorageError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut attempts: Vec<QuizAttempt> =
            guard.attempts.iter().map(|(a, _)| a.clone()).collect();
        attempts.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then(b.id().value().cmp(&a.id().value()))
        });
        Ok(attempts)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<QuizAttempt, StorageError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .attempts
            .iter()
            .find(|(a, _)| a.id() == id)
            .map(|(a, _)| a.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn get_attempt_with_results(
        &self,
        id: AttemptId,
    ) -> Result<(QuizAttempt, Vec<QuestionResult>), StorageError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .attempts
            .iter()
            .find(|(a, _)| a.id() == id)
            .map(|(a, r)| (a.clone(), r.clone()))
            .ok_or(StorageError::NotFound)
    }

    async fn delete_attempt(&self, id: AttemptId) -> Result<(), StorageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.attempts.retain(|(a, _)| a.id() != id);
        Ok(())
    }
}

/// Aggregates the attempt repository behind a trait object for backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            attempts: Arc::new(InMemoryRepository::new()),
        }
    }
}
