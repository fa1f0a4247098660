use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::AttemptId;
use storage::repository::{AttemptRepository, Storage};

use crate::error::AppServicesError;
use crate::history_service::HistoryService;
use crate::question_source::{OpenTdbClient, QuestionSource};
use crate::quiz::{QuizCompleted, QuizService};
use crate::results_service::ResultsService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    attempts: Arc<dyn AttemptRepository>,
    quiz: QuizService,
    history: HistoryService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the live trivia API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let source: Arc<dyn QuestionSource> = Arc::new(OpenTdbClient::new());
        Ok(Self::new(clock, source, storage))
    }

    /// Wire services over explicit collaborators; used directly in tests.
    #[must_use]
    pub fn new(clock: Clock, source: Arc<dyn QuestionSource>, storage: Storage) -> Self {
        let attempts = Arc::clone(&storage.attempts);
        let quiz = QuizService::new(clock, source, Arc::clone(&attempts));
        let history = HistoryService::new(Arc::clone(&attempts));
        Self {
            attempts,
            quiz,
            history,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizService {
        &self.quiz
    }

    #[must_use]
    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    /// Results view for a quiz that just completed.
    #[must_use]
    pub fn results_for(&self, completed: QuizCompleted) -> ResultsService {
        ResultsService::from_completed(Arc::clone(&self.attempts), completed)
    }

    /// Results view for a stored attempt, e.g. opened from history.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the attempt cannot be loaded.
    pub async fn results_for_attempt(
        &self,
        id: AttemptId,
    ) -> Result<ResultsService, AppServicesError> {
        let attempt = self.attempts.get_attempt(id).await?;
        Ok(ResultsService::from_attempt(
            Arc::clone(&self.attempts),
            &attempt,
        ))
    }
}
