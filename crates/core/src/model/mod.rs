mod attempt;
mod ids;
mod question;
mod result;
mod view;

pub use attempt::{AttemptError, QuizAttempt};
pub use ids::{AttemptId, ParseIdError, ResultId};
pub use question::{Difficulty, ParseDifficultyError, Question, QuestionError};
pub use result::QuestionResult;
pub use view::{QuizHistoryItem, QuizReview, ReviewedQuestion};
