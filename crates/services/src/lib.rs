#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod history_service;
pub mod question_source;
pub mod quiz;
pub mod results_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, HistoryError, QuestionSourceError, QuizError, ResultsError,
};
pub use history_service::{HistoryService, HistoryState};
pub use question_source::{OpenTdbClient, QuestionSource};
pub use quiz::{FetchTicket, NextOutcome, QuizCompleted, QuizFlow, QuizService, QuizSession, QuizState};
pub use results_service::{ResultsService, ResultsState};
