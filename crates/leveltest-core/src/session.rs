//! The test-session state machine.
//!
//! Drives one linear, non-branching question sequence: load the question
//! set, present questions one at a time with a per-question timer, collect
//! answers, detect completion, then score and submit. One `TestSession`
//! exclusively owns its state for the duration of one session; abandoning
//! the value discards the state with no partial submission.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::error::{ApiError, SessionError};
use crate::model::{Answer, Identity, Question, SessionVariant};
use crate::scoring::{self, ProficiencyLevel, ScoreSummary};
use crate::traits::{QuestionSource, Submission, SubmissionClient};

/// Where a session is in its lifecycle.
///
/// One tagged status instead of independent flags — the illegal
/// combinations (completed while mid-question, submitting before
/// completion) are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading,
    /// Terminal for this load attempt; a caller may start again.
    LoadFailed,
    InProgress,
    Completed,
    Submitting,
    Submitted,
    /// Terminal until a caller retries submission; computed results are
    /// retained in memory.
    SubmissionFailed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Loading => "loading",
            SessionStatus::LoadFailed => "load-failed",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Submitting => "submitting",
            SessionStatus::Submitted => "submitted",
            SessionStatus::SubmissionFailed => "submission-failed",
        };
        write!(f, "{name}")
    }
}

/// Computed results, retained across submission retries.
#[derive(Debug, Clone)]
pub struct SessionResults {
    pub summary: ScoreSummary,
    /// Proficiency label. Classified locally at completion; replaced by the
    /// server-supplied level when the submission ack carries one.
    pub level: String,
}

/// Outcome of one accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// More questions remain; the next one is current and its timer runs.
    Next,
    /// That was the last question; results are computed and the session is
    /// ready to submit.
    Completed,
}

/// The state machine driving one test run.
pub struct TestSession {
    source: Arc<dyn QuestionSource>,
    submitter: Arc<dyn SubmissionClient>,
    variant: SessionVariant,
    session_id: Uuid,
    status: SessionStatus,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    current_index: usize,
    question_started_at: Option<Instant>,
    results: Option<SessionResults>,
}

impl TestSession {
    pub fn new(
        source: Arc<dyn QuestionSource>,
        submitter: Arc<dyn SubmissionClient>,
        variant: SessionVariant,
    ) -> Self {
        Self {
            source,
            submitter,
            variant,
            session_id: Uuid::new_v4(),
            status: SessionStatus::Idle,
            questions: Vec::new(),
            answers: Vec::new(),
            current_index: 0,
            question_started_at: None,
            results: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn variant(&self) -> SessionVariant {
        self.variant
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Zero-based index of the question currently presented.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question currently awaiting an answer, while in progress.
    pub fn current_question(&self) -> Option<&Question> {
        if self.status == SessionStatus::InProgress {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    /// Computed results, available from completion onward.
    pub fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    /// Load the question set and enter the question loop.
    ///
    /// Valid from Idle, or from LoadFailed to retry the load. Any fetch
    /// error or an empty result leaves the session in LoadFailed.
    pub async fn start(&mut self, identity: Option<&Identity>) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Idle | SessionStatus::LoadFailed => {}
            actual => return Err(SessionError::InvalidState { actual }),
        }

        self.status = SessionStatus::Loading;
        tracing::debug!(session = %self.session_id, variant = %self.variant, "loading questions");

        match self.source.load(self.variant, identity).await {
            Ok(questions) if questions.is_empty() => {
                self.status = SessionStatus::LoadFailed;
                tracing::warn!(session = %self.session_id, "load returned zero questions");
                Err(SessionError::Api(ApiError::EmptyResult))
            }
            Ok(questions) => {
                tracing::info!(
                    session = %self.session_id,
                    count = questions.len(),
                    "session started"
                );
                self.questions = questions;
                self.answers.clear();
                self.current_index = 0;
                self.results = None;
                self.status = SessionStatus::InProgress;
                self.question_started_at = Some(Instant::now());
                Ok(())
            }
            Err(e) => {
                self.status = SessionStatus::LoadFailed;
                tracing::warn!(session = %self.session_id, error = %e, "question load failed");
                Err(SessionError::Api(e))
            }
        }
    }

    /// Record the learner's choice for the current question.
    ///
    /// Rejected unless the session is InProgress; rejected when
    /// `selected_text` matches none of the current question's display
    /// options. Rejections leave the state unchanged. On the last question
    /// the scoring summary is computed immediately and retained.
    pub fn submit_answer(&mut self, selected_text: &str) -> Result<AnswerOutcome, SessionError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidState {
                actual: self.status,
            });
        }

        let question = &self.questions[self.current_index];
        if !question.options.iter().any(|o| o == selected_text) {
            return Err(SessionError::InvalidAnswer(selected_text.to_string()));
        }

        let elapsed = self
            .question_started_at
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        self.answers.push(Answer {
            question_id: question.id,
            selected_text: selected_text.to_string(),
            is_correct: scoring::is_correct(question, selected_text),
            response_time_seconds: elapsed,
        });

        if self.current_index < self.questions.len() - 1 {
            self.current_index += 1;
            self.question_started_at = Some(Instant::now());
            tracing::debug!(
                session = %self.session_id,
                index = self.current_index,
                "advanced to next question"
            );
            Ok(AnswerOutcome::Next)
        } else {
            self.status = SessionStatus::Completed;
            self.question_started_at = None;
            let summary = scoring::score(&self.questions, &self.answers);
            let level = ProficiencyLevel::classify(summary.percentage).to_string();
            tracing::info!(
                session = %self.session_id,
                correct = summary.correct_count,
                percentage = summary.percentage,
                "session completed"
            );
            self.results = Some(SessionResults { summary, level });
            Ok(AnswerOutcome::Completed)
        }
    }

    /// Persist the computed results.
    ///
    /// Valid from Completed, or from SubmissionFailed to retry. Retries
    /// reuse the retained results; nothing is recomputed or re-answered. A
    /// server-supplied level in the ack supersedes the local
    /// classification.
    pub async fn submit_results(
        &mut self,
        identity: Option<&Identity>,
    ) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Completed | SessionStatus::SubmissionFailed => {}
            actual => return Err(SessionError::InvalidState { actual }),
        }
        let Some(results) = self.results.as_ref() else {
            return Err(SessionError::InvalidState {
                actual: self.status,
            });
        };

        let submission = Submission::assemble(
            self.session_id,
            self.variant,
            &self.questions,
            &self.answers,
            &results.summary,
        );
        self.status = SessionStatus::Submitting;
        tracing::debug!(session = %self.session_id, "submitting results");

        match self.submitter.submit(&submission, identity).await {
            Ok(ack) => {
                self.status = SessionStatus::Submitted;
                if let Some(level) = ack.level {
                    if let Some(results) = self.results.as_mut() {
                        tracing::debug!(
                            session = %self.session_id,
                            level = %level,
                            "server level supersedes local classification"
                        );
                        results.level = level;
                    }
                }
                tracing::info!(session = %self.session_id, "submission acknowledged");
                Ok(())
            }
            Err(e) => {
                self.status = SessionStatus::SubmissionFailed;
                tracing::warn!(
                    session = %self.session_id,
                    error = %e,
                    "submission failed; results retained for retry"
                );
                Err(SessionError::Api(e))
            }
        }
    }

    /// Discard the in-memory session without a partial submission.
    pub fn abandon(self) {
        tracing::debug!(
            session = %self.session_id,
            status = %self.status,
            answered = self.answers.len(),
            "session abandoned"
        );
    }
}
