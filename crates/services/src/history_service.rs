use std::sync::Arc;

use quiz_core::model::{AttemptId, QuizHistoryItem};
use storage::repository::AttemptRepository;

use crate::error::HistoryError;

/// Render-facing state of the history screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    pub attempts: Vec<QuizHistoryItem>,
    pub is_loading: bool,
    pub is_empty: bool,
}

impl HistoryState {
    /// Initial state while the list is being fetched.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            attempts: Vec::new(),
            is_loading: true,
            is_empty: false,
        }
    }
}

/// Lists past attempts and deletes entries on request.
#[derive(Clone)]
pub struct HistoryService {
    attempts: Arc<dyn AttemptRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    /// Load all stored attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` on storage failures.
    pub async fn load(&self) -> Result<HistoryState, HistoryError> {
        let items: Vec<QuizHistoryItem> = self
            .attempts
            .list_attempts()
            .await?
            .iter()
            .map(QuizHistoryItem::from_attempt)
            .collect();

        Ok(HistoryState {
            is_empty: items.is_empty(),
            is_loading: false,
            attempts: items,
        })
    }

    /// Delete one attempt; its question results go with it.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` on storage failures.
    pub async fn delete(&self, id: AttemptId) -> Result<(), HistoryError> {
        self.attempts.delete_attempt(id).await?;
        Ok(())
    }
}
