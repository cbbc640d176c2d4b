//! HTTP question source.
//!
//! Fetches the question set for a session variant and runs the one-pass
//! encoding normalization before anything crosses the crate boundary.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use leveltest_core::error::ApiError;
use leveltest_core::model::{Identity, Question, RawQuestion, SessionVariant};
use leveltest_core::normalize::normalize_questions;
use leveltest_core::traits::QuestionSource;

use crate::config::ClientConfig;
use crate::{error_message, transport_error};

/// Question source backed by the platform HTTP API.
pub struct HttpQuestionSource {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuestionSource {
    pub fn new(config: &ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            client,
        }
    }

    fn endpoint(&self, variant: SessionVariant) -> String {
        match variant {
            SessionVariant::Placement => format!("{}/placement-questions", self.base_url),
            SessionVariant::Practice => format!("{}/recommended-questions", self.base_url),
            SessionVariant::Classroom { test_id } => {
                format!("{}/tests/{}/questions", self.base_url, test_id)
            }
        }
    }

    /// Preview the personalized practice set.
    ///
    /// Unlike a session load, an empty preview is not an error — it means
    /// the learner has no recommendations yet.
    pub async fn practice_preview(
        &self,
        identity: &Identity,
    ) -> Result<PracticePreview, ApiError> {
        let response = self
            .client
            .get(format!("{}/personalized-practice-questions", self.base_url))
            .bearer_auth(&identity.token)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(ApiError::Auth(error_message(response).await));
        }
        if status >= 400 {
            return Err(ApiError::Server {
                status,
                message: error_message(response).await,
            });
        }

        let payload: QuestionsPayload = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(format!("failed to parse question payload: {e}")))?;

        let (raw, has_enough_data) = match payload {
            QuestionsPayload::Wrapped {
                questions,
                has_enough_data,
            } => (questions, has_enough_data),
            QuestionsPayload::Bare(questions) => (questions, false),
        };
        Ok(PracticePreview {
            questions: normalize_questions(raw)?,
            has_enough_data,
        })
    }
}

/// The personalized practice preview: the upcoming question set plus
/// whether the learner's history is deep enough for personalization.
#[derive(Debug)]
pub struct PracticePreview {
    pub questions: Vec<Question>,
    pub has_enough_data: bool,
}

/// Practice responses optionally arrive wrapped with a personalization
/// flag; the other endpoints return a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionsPayload {
    Wrapped {
        questions: Vec<RawQuestion>,
        #[serde(default, rename = "hasEnoughData")]
        has_enough_data: bool,
    },
    Bare(Vec<RawQuestion>),
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    #[instrument(skip(self, identity), fields(variant = %variant))]
    async fn load(
        &self,
        variant: SessionVariant,
        identity: Option<&Identity>,
    ) -> Result<Vec<Question>, ApiError> {
        let mut request = self.client.get(self.endpoint(variant));
        if let Some(identity) = identity {
            request = request.bearer_auth(&identity.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(ApiError::Auth(error_message(response).await));
        }
        if status >= 400 {
            return Err(ApiError::Server {
                status,
                message: error_message(response).await,
            });
        }

        let payload: QuestionsPayload = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(format!("failed to parse question payload: {e}")))?;

        let raw = match payload {
            QuestionsPayload::Wrapped {
                questions,
                has_enough_data,
            } => {
                tracing::debug!(has_enough_data, "personalized payload received");
                questions
            }
            QuestionsPayload::Bare(questions) => questions,
        };

        if raw.is_empty() {
            return Err(ApiError::EmptyResult);
        }
        normalize_questions(raw)
    }
}
