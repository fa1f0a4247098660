use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quiz_core::model::{
    AttemptId, Difficulty, Question, QuestionResult, QuizAttempt,
};
use quiz_core::time::fixed_clock;
use services::error::{QuestionSourceError, QuizError};
use services::question_source::QuestionSource;
use services::{AppServices, QuizFlow, QuizState, ResultsService};
use storage::repository::{
    AttemptRepository, InMemoryRepository, NewAttemptRecord, NewQuestionResultRecord, Storage,
    StorageError,
};

fn build_question(id: usize) -> Question {
    Question::new(
        format!("Q{id}"),
        format!("correct{id}"),
        vec![
            format!("wrong{id}a"),
            format!("correct{id}"),
            format!("wrong{id}b"),
            format!("wrong{id}c"),
        ],
        "General Knowledge",
        Difficulty::Easy,
    )
    .unwrap()
}

/// Question source returning a fixed batch, counting fetches.
struct StubSource {
    batch: Vec<Question>,
    fetches: AtomicUsize,
}

impl StubSource {
    fn with_batch(n: usize) -> Arc<Self> {
        Arc::new(Self {
            batch: (0..n).map(build_question).collect(),
            fetches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl QuestionSource for StubSource {
    async fn fetch_questions(
        &self,
        _amount: u8,
        _category: u32,
        _difficulty: Difficulty,
    ) -> Result<Vec<Question>, QuestionSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.batch.clone())
    }
}

/// Repository decorator counting review loads.
struct CountingRepository {
    inner: InMemoryRepository,
    result_fetches: AtomicUsize,
}

#[async_trait]
impl AttemptRepository for CountingRepository {
    async fn save_attempt(
        &self,
        attempt: NewAttemptRecord,
        results: Vec<NewQuestionResultRecord>,
    ) -> Result<AttemptId, StorageError> {
        self.inner.save_attempt(attempt, results).await
    }

    async fn list_attempts(&self) -> Result<Vec<QuizAttempt>, StorageError> {
        self.inner.list_attempts().await
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<QuizAttempt, StorageError> {
        self.inner.get_attempt(id).await
    }

    async fn get_attempt_with_results(
        &self,
        id: AttemptId,
    ) -> Result<(QuizAttempt, Vec<QuestionResult>), StorageError> {
        self.result_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.get_attempt_with_results(id).await
    }

    async fn delete_attempt(&self, id: AttemptId) -> Result<(), StorageError> {
        self.inner.delete_attempt(id).await
    }
}

/// Repository whose writes always fail.
struct BrokenRepository;

#[async_trait]
impl AttemptRepository for BrokenRepository {
    async fn save_attempt(
        &self,
        _attempt: NewAttemptRecord,
        _results: Vec<NewQuestionResultRecord>,
    ) -> Result<AttemptId, StorageError> {
        Err(StorageError::Connection("database is gone".to_string()))
    }

    async fn list_attempts(&self) -> Result<Vec<QuizAttempt>, StorageError> {
        Ok(Vec::new())
    }

    async fn get_attempt(&self, _id: AttemptId) -> Result<QuizAttempt, StorageError> {
        Err(StorageError::NotFound)
    }

    async fn get_attempt_with_results(
        &self,
        _id: AttemptId,
    ) -> Result<(QuizAttempt, Vec<QuestionResult>), StorageError> {
        Err(StorageError::NotFound)
    }

    async fn delete_attempt(&self, _id: AttemptId) -> Result<(), StorageError> {
        Ok(())
    }
}

fn app(source: Arc<StubSource>, repo: InMemoryRepository) -> AppServices {
    AppServices::new(
        fixed_clock(),
        source,
        Storage {
            attempts: Arc::new(repo),
        },
    )
}

fn selected_correct_answer(flow: &QuizFlow) -> String {
    match flow.state() {
        QuizState::InProgress { question, .. } => question.correct_answer().to_string(),
        other => panic!("expected InProgress, got {other:?}"),
    }
}

#[tokio::test]
async fn perfect_run_persists_attempt_and_results() {
    let repo = InMemoryRepository::new();
    let services = app(StubSource::with_batch(5), repo.clone());

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;

    let mut completed = None;
    for _ in 0..5 {
        let answer = selected_correct_answer(&flow);
        flow.select(&answer).unwrap();
        completed = services.quiz().next(&mut flow).await.unwrap();
    }

    let completed = completed.expect("finished quiz emits navigation signal");
    assert_eq!(completed.correct_answers_count, 5);
    assert_eq!(completed.total_questions, 5);

    let (attempt, results) = repo
        .get_attempt_with_results(completed.attempt_id)
        .await
        .unwrap();
    assert_eq!(attempt.correct_answers_count(), 5);
    assert_eq!(attempt.total_questions(), 5);
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.was_correct));

    let listed = services.history().load().await.unwrap();
    assert_eq!(listed.attempts.len(), 1);
    assert_eq!(listed.attempts[0].score, "5/5");

    let results_view = services.results_for(completed);
    assert_eq!(results_view.state().result_title, "Идеально!");
    assert_eq!(
        results_view.state().result_subtitle,
        "5/5 — вы ответили на всё правильно. Это блестящий результат!"
    );
}

#[tokio::test]
async fn skipped_question_is_stored_as_unanswered() {
    let repo = InMemoryRepository::new();
    let services = app(StubSource::with_batch(5), repo.clone());

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;

    let mut completed = None;
    for index in 0..5 {
        let answer = selected_correct_answer(&flow);
        if index == 2 {
            // Answer question 3, then toggle the selection back off.
            flow.select(&answer).unwrap();
            flow.select(&answer).unwrap();
        } else {
            flow.select(&answer).unwrap();
        }
        completed = services.quiz().next(&mut flow).await.unwrap();
    }

    let completed = completed.unwrap();
    assert_eq!(completed.correct_answers_count, 4);

    let (_, results) = repo
        .get_attempt_with_results(completed.attempt_id)
        .await
        .unwrap();
    assert_eq!(results[2].user_answer, "");
    assert!(!results[2].was_correct);
    assert!(results.iter().enumerate().all(|(i, r)| i == 2 || r.was_correct));
}

#[tokio::test]
async fn review_round_trip_matches_recomputation() {
    let repo = InMemoryRepository::new();
    let services = app(StubSource::with_batch(4), repo.clone());

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;

    // Answer two of four: one correct, one wrong, skip the rest.
    let answer = selected_correct_answer(&flow);
    flow.select(&answer).unwrap();
    services.quiz().next(&mut flow).await.unwrap();

    flow.select("wrong1a").unwrap();
    services.quiz().next(&mut flow).await.unwrap();

    services.quiz().next(&mut flow).await.unwrap();
    let completed = services.quiz().next(&mut flow).await.unwrap().unwrap();

    let mut results_view = services.results_for(completed);
    results_view.toggle_review().await.unwrap();
    let review = results_view.state().review.clone().unwrap();

    assert_eq!(review.questions.len(), 4);
    for question in &review.questions {
        let recomputed =
            !question.user_answer.is_empty() && question.user_answer == question.correct_answer;
        assert_eq!(question.was_correct, recomputed);
    }
    assert_eq!(review.questions[2].user_answer, "");
    assert_eq!(review.questions[3].user_answer, "");
}

#[tokio::test]
async fn toggling_review_twice_fetches_once() {
    let repo = InMemoryRepository::new();
    let services = app(StubSource::with_batch(2), repo.clone());

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;
    flow.select(&selected_correct_answer(&flow)).unwrap();
    services.quiz().next(&mut flow).await.unwrap();
    flow.select(&selected_correct_answer(&flow)).unwrap();
    let completed = services.quiz().next(&mut flow).await.unwrap().unwrap();

    let counting = Arc::new(CountingRepository {
        inner: repo,
        result_fetches: AtomicUsize::new(0),
    });
    let mut results_view =
        ResultsService::from_completed(Arc::clone(&counting) as Arc<dyn AttemptRepository>, completed);

    results_view.toggle_review().await.unwrap();
    assert!(results_view.state().review_visible);

    results_view.toggle_review().await.unwrap();
    assert!(!results_view.state().review_visible);

    results_view.toggle_review().await.unwrap();
    assert!(results_view.state().review_visible);

    // Only the first toggle-on hits storage; the rest reuse the cache.
    assert_eq!(counting.result_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retry_replays_stored_questions_without_fetching() {
    let repo = InMemoryRepository::new();
    let source = StubSource::with_batch(3);
    let services = app(Arc::clone(&source), repo.clone());

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;
    for _ in 0..3 {
        flow.select(&selected_correct_answer(&flow)).unwrap();
        services.quiz().next(&mut flow).await.unwrap();
    }
    let listed = services.history().load().await.unwrap();
    let attempt_id = listed.attempts[0].id;
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

    let mut retry_flow = QuizFlow::new();
    services.quiz().start_retry(&mut retry_flow, attempt_id).await;

    match retry_flow.state() {
        QuizState::InProgress { question, total, .. } => {
            assert_eq!(*total, 3);
            assert_eq!(question.question_text(), "Q0");
        }
        other => panic!("expected InProgress, got {other:?}"),
    }
    // Replay reads from storage, not from the network.
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_persistence_lands_in_error_and_discards_session() {
    let services = AppServices::new(
        fixed_clock(),
        StubSource::with_batch(2),
        Storage {
            attempts: Arc::new(BrokenRepository),
        },
    );

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;
    flow.select(&selected_correct_answer(&flow)).unwrap();
    services.quiz().next(&mut flow).await.unwrap();
    flow.select(&selected_correct_answer(&flow)).unwrap();

    // The final "next" tries to save the attempt; the write fails.
    let err = services.quiz().next(&mut flow).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::Storage(StorageError::Connection(_))
    ));

    // Terminal: the flow is in Error and the session data is gone.
    assert!(matches!(flow.state(), QuizState::Error { .. }));
    assert!(matches!(flow.select("x"), Err(QuizError::NotInProgress)));
    assert!(matches!(flow.next(), Err(QuizError::NotInProgress)));

    // Recovery only through an explicit restart.
    services.quiz().start_quiz(&mut flow).await;
    assert!(matches!(flow.state(), QuizState::InProgress { .. }));
}

#[tokio::test]
async fn empty_batch_lands_in_error_state() {
    let repo = InMemoryRepository::new();
    let services = app(StubSource::with_batch(0), repo);

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;
    assert!(matches!(flow.state(), QuizState::Error { .. }));
}

#[tokio::test]
async fn deleting_an_attempt_hides_it_from_history_and_review() {
    let repo = InMemoryRepository::new();
    let services = app(StubSource::with_batch(2), repo.clone());

    let mut flow = QuizFlow::new();
    services.quiz().start_quiz(&mut flow).await;
    flow.select(&selected_correct_answer(&flow)).unwrap();
    services.quiz().next(&mut flow).await.unwrap();
    flow.select(&selected_correct_answer(&flow)).unwrap();
    let completed = services.quiz().next(&mut flow).await.unwrap().unwrap();

    services.history().delete(completed.attempt_id).await.unwrap();

    assert!(services.history().load().await.unwrap().is_empty);
    assert!(matches!(
        repo.get_attempt_with_results(completed.attempt_id).await,
        Err(StorageError::NotFound)
    ));
    assert!(services.results_for_attempt(completed.attempt_id).await.is_err());
}
