//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AttemptError, QuestionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the trivia question source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("question source request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("question source rejected the request (response code {0})")]
    Api(i32),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by the quiz engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("the fetched batch contained no questions")]
    EmptyBatch,

    #[error("no quiz is in progress")]
    NotInProgress,

    #[error("the quiz session is already completed")]
    Completed,

    #[error(transparent)]
    Fetch(#[from] QuestionSourceError),

    #[error(transparent)]
    Attempt(#[from] AttemptError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsError {
    #[error(transparent)]
    Attempt(#[from] AttemptError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `HistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
