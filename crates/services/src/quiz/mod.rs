mod flow;
mod service;
mod session;

pub use flow::{FetchTicket, NextOutcome, QuizFlow, QuizState};
pub use service::{QuizCompleted, QuizService};
pub use session::QuizSession;
