use std::collections::HashMap;

use quiz_core::model::Question;

use crate::error::QuizError;

/// What a single "next" step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Advance {
    Next,
    Finished,
}

/// In-memory state of one quiz run.
///
/// The answer map is write-once per index: each advance finalizes exactly one
/// index and earlier entries are never edited. A missing entry means the
/// question was left unanswered.
#[derive(Debug)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: HashMap<usize, String>,
    current: usize,
    selected: Option<String>,
    finished: bool,
}

impl QuizSession {
    /// Build a session over a fetched batch.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyBatch` if no questions were provided.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyBatch);
        }

        Ok(Self {
            questions,
            answers: HashMap::new(),
            current: 0,
            selected: None,
            finished: false,
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// "Next" is enabled if and only if a selection is present.
    #[must_use]
    pub fn next_enabled(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The finalized answer for an index; empty string means unanswered.
    #[must_use]
    pub fn answer_for(&self, index: usize) -> &str {
        self.answers.get(&index).map_or("", String::as_str)
    }

    /// Select an answer for the current question, or clear the selection
    /// when the already-selected answer is picked again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Completed` once the session is finished.
    pub fn select_answer(&mut self, answer: &str) -> Result<(), QuizError> {
        if self.finished {
            return Err(QuizError::Completed);
        }

        if self.selected.as_deref() == Some(answer) {
            self.selected = None;
        } else {
            self.selected = Some(answer.to_string());
        }
        Ok(())
    }

    /// Finalize the current index and move on.
    ///
    /// Records the current selection (or its absence) for the current index,
    /// then advances. Advancing past the last question finishes the session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Completed` once the session is finished.
    pub(crate) fn advance(&mut self) -> Result<Advance, QuizError> {
        if self.finished {
            return Err(QuizError::Completed);
        }

        if let Some(answer) = self.selected.take() {
            self.answers.insert(self.current, answer);
        }

        self.current += 1;
        if self.current >= self.questions.len() {
            self.finished = true;
            Ok(Advance::Finished)
        } else {
            Ok(Advance::Next)
        }
    }

    /// Number of indices whose recorded answer matches that question's
    /// correct answer.
    #[must_use]
    pub fn correct_count(&self) -> u32 {
        let count = self
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| q.is_correct(self.answer_for(*i)) && !self.answer_for(*i).is_empty())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
