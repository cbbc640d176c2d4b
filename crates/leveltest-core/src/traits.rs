//! Collaborator seams for the session engine.
//!
//! These async traits are implemented by the `leveltest-api` crate; the
//! session state machine only ever sees the trait objects.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Answer, Identity, Question, SessionVariant};
use crate::scoring::ScoreSummary;

/// Fetches and normalizes the question set for one session variant.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Load questions for `variant`.
    ///
    /// Fails with [`ApiError::EmptyResult`] when the backend returns zero
    /// questions; the returned list is always canonical (normalized).
    async fn load(
        &self,
        variant: SessionVariant,
        identity: Option<&Identity>,
    ) -> Result<Vec<Question>, ApiError>;
}

/// Persists a finished session to the backend.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Submit a finished session.
    ///
    /// Not retried automatically; the engine keeps the computed results so
    /// a caller can retry without recomputation.
    async fn submit(
        &self,
        submission: &Submission,
        identity: Option<&Identity>,
    ) -> Result<SubmissionAck, ApiError>;
}

/// A finished session, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Stable identifier carried so the backend can deduplicate retries.
    pub session_id: Uuid,
    pub variant: SessionVariant,
    /// Percentage score.
    pub score: f64,
    /// Mean per-question response time in seconds.
    pub avg_time: f64,
    pub answers: Vec<SubmittedAnswer>,
    pub completed_at: DateTime<Utc>,
}

/// One answer in the submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_option: String,
    pub correct_option: String,
    pub response_time: f64,
}

impl Submission {
    /// Assemble the payload from a finished session's state.
    pub fn assemble(
        session_id: Uuid,
        variant: SessionVariant,
        questions: &[Question],
        answers: &[Answer],
        summary: &ScoreSummary,
    ) -> Self {
        let answers = questions
            .iter()
            .zip(answers)
            .map(|(question, answer)| SubmittedAnswer {
                question_id: question.id,
                selected_option: answer.selected_text.clone(),
                correct_option: question.correct_answer.clone(),
                response_time: answer.response_time_seconds,
            })
            .collect();

        Self {
            session_id,
            variant,
            score: summary.percentage,
            avg_time: summary.avg_response_time,
            answers,
            completed_at: Utc::now(),
        }
    }
}

/// Backend acknowledgement of a submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionAck {
    /// Server-computed proficiency label. Authoritative when present;
    /// absent for backends that only acknowledge.
    #[serde(default)]
    pub level: Option<String>,
}
