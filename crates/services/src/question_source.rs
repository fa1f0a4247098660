use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;

use quiz_core::model::{Difficulty, Question, QuestionError};

use crate::error::QuestionSourceError;

/// Contract for fetching one batch of trivia questions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch `amount` multiple-choice questions for a category/difficulty.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` for transport, API-level, or payload
    /// validation failures.
    async fn fetch_questions(
        &self,
        amount: u8,
        category: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, QuestionSourceError>;
}

/// Client for the Open Trivia Database REST API.
#[derive(Clone)]
pub struct OpenTdbClient {
    client: Client,
    base_url: String,
}

impl Default for OpenTdbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenTdbClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "https://opentdb.com".to_string(),
        }
    }

    /// Point the client at a different host, mainly for tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl QuestionSource for OpenTdbClient {
    async fn fetch_questions(
        &self,
        amount: u8,
        category: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, QuestionSourceError> {
        let url = format!("{}/api.php", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("type", "multiple".to_string()),
                ("amount", amount.to_string()),
                ("category", category.to_string()),
                ("difficulty", difficulty.as_str().to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }

        let body: TriviaResponse = response.json().await?;
        if body.response_code != 0 {
            return Err(QuestionSourceError::Api(body.response_code));
        }

        log::debug!("fetched {} questions from opentdb", body.results.len());

        let mut questions = Vec::with_capacity(body.results.len());
        for api_question in body.results {
            questions.push(api_question.into_question(difficulty)?);
        }
        Ok(questions)
    }
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: i32,
    results: Vec<ApiQuestion>,
}

/// One question as it arrives on the wire, HTML-entity-encoded.
#[derive(Debug, Deserialize)]
struct ApiQuestion {
    category: String,
    difficulty: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl ApiQuestion {
    /// Decode entities, shuffle the answer order, and validate.
    ///
    /// The per-question difficulty string from the payload wins; if it is
    /// unparseable the requested difficulty is used instead.
    fn into_question(self, requested: Difficulty) -> Result<Question, QuestionError> {
        let correct_answer = decode(&self.correct_answer);
        let mut all_answers: Vec<String> =
            self.incorrect_answers.iter().map(|a| decode(a)).collect();
        all_answers.push(correct_answer.clone());
        all_answers.shuffle(&mut rand::rng());

        let difficulty = self.difficulty.parse().unwrap_or(requested);

        Question::new(
            decode(&self.question),
            correct_answer,
            all_answers,
            decode(&self.category),
            difficulty,
        )
    }
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
