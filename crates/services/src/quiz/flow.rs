use quiz_core::model::Question;

use super::session::{Advance, QuizSession};
use crate::error::QuizError;

/// Render-facing state of the quiz screen, one variant per view.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizState {
    Welcome,
    Loading,
    InProgress {
        question: Question,
        index: usize,
        total: usize,
        selected: Option<String>,
        next_enabled: bool,
    },
    Error {
        message: String,
    },
}

/// Identity of one issued fetch; responses for an older ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Outcome of a "next" action.
#[derive(Debug)]
pub enum NextOutcome {
    Advanced,
    Finished(QuizSession),
}

/// The quiz progression state machine.
///
/// Owns the session-local state exclusively and resets it on every new quiz.
/// Selection and advance actions are rejected outside `InProgress`, which is
/// what guarantees a fetch fully resolves before any answer is accepted.
#[derive(Debug)]
pub struct QuizFlow {
    state: QuizState,
    session: Option<QuizSession>,
    generation: u64,
}

impl Default for QuizFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizFlow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: QuizState::Welcome,
            session: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// Enter `Loading` and hand out the ticket the pending fetch must present.
    ///
    /// Discards any in-progress session; an older in-flight fetch becomes
    /// stale and will be ignored when it lands.
    pub fn start(&mut self) -> FetchTicket {
        self.session = None;
        self.generation += 1;
        self.state = QuizState::Loading;
        FetchTicket(self.generation)
    }

    /// Apply a completed fetch. Returns `true` if the outcome was applied,
    /// `false` if it was stale and dropped.
    pub fn resolve_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<Question>, QuizError>,
    ) -> bool {
        if ticket.0 != self.generation || self.state != QuizState::Loading {
            log::warn!("ignoring stale fetch result (ticket {})", ticket.0);
            return false;
        }

        match outcome.and_then(QuizSession::from_questions) {
            Ok(session) => {
                self.session = Some(session);
                self.refresh_in_progress();
            }
            Err(err) => {
                log::error!("quiz fetch failed: {err}");
                self.state = QuizState::Error {
                    message: err.to_string(),
                };
            }
        }
        true
    }

    /// Select (or toggle off) an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` outside the `InProgress` state.
    pub fn select(&mut self, answer: &str) -> Result<(), QuizError> {
        if !matches!(self.state, QuizState::InProgress { .. }) {
            return Err(QuizError::NotInProgress);
        }
        let session = self.session.as_mut().ok_or(QuizError::NotInProgress)?;
        session.select_answer(answer)?;
        self.refresh_in_progress();
        Ok(())
    }

    /// Finalize the current question and advance; past the last question the
    /// completed session is handed back for scoring and persistence.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` outside the `InProgress` state.
    pub fn next(&mut self) -> Result<NextOutcome, QuizError> {
        if !matches!(self.state, QuizState::InProgress { .. }) {
            return Err(QuizError::NotInProgress);
        }
        let session = self.session.as_mut().ok_or(QuizError::NotInProgress)?;

        match session.advance()? {
            Advance::Next => {
                self.refresh_in_progress();
                Ok(NextOutcome::Advanced)
            }
            Advance::Finished => {
                let session = self.session.take().ok_or(QuizError::NotInProgress)?;
                // The hosting shell navigates to results once the save lands.
                self.state = QuizState::Welcome;
                Ok(NextOutcome::Finished(session))
            }
        }
    }

    /// Record a terminal failure for the current session.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.session = None;
        self.state = QuizState::Error {
            message: message.into(),
        };
    }

    /// Return to the welcome screen unconditionally, discarding any
    /// in-progress session.
    pub fn back(&mut self) {
        self.session = None;
        self.generation += 1;
        self.state = QuizState::Welcome;
    }

    fn refresh_in_progress(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(question) = session.current_question() else {
            return;
        };
        self.state = QuizState::InProgress {
            question: question.clone(),
            index: session.current_index(),
            total: session.total(),
            selected: session.selected_answer().map(str::to_string),
            next_enabled: session.next_enabled(),
        };
    }
}
