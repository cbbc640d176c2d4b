//! HTTP submission client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use leveltest_core::error::ApiError;
use leveltest_core::model::{Identity, SessionVariant};
use leveltest_core::traits::{Submission, SubmissionAck, SubmissionClient, SubmittedAnswer};

use crate::config::ClientConfig;
use crate::{error_message, transport_error};

/// Submission client backed by the platform HTTP API.
///
/// Placement and practice sessions post to `/complete-test`; classroom
/// sessions post to `/tests/submit` with the assigned test id.
pub struct HttpSubmissionClient {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSubmissionClient {
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
            SessionVariant::Classroom { .. } => format!("{}/tests/submit", self.base_url),
            _ => format!("{}/complete-test", self.base_url),
        }
    }
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    score: f64,
    avg_time: f64,
    answers: &'a [SubmittedAnswer],
    test_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_id: Option<i64>,
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    #[instrument(skip(self, submission, identity), fields(session = %submission.session_id))]
    async fn submit(
        &self,
        submission: &Submission,
        identity: Option<&Identity>,
    ) -> Result<SubmissionAck, ApiError> {
        let Some(identity) = identity.filter(|i| !i.token.is_empty()) else {
            return Err(ApiError::Auth("missing bearer token".into()));
        };

        let test_id = match submission.variant {
            SessionVariant::Classroom { test_id } => Some(test_id),
            _ => None,
        };
        let body = SubmitBody {
            score: submission.score,
            avg_time: submission.avg_time,
            answers: &submission.answers,
            test_type: submission.variant.test_type(),
            test_id,
        };

        let response = self
            .client
            .post(self.endpoint(submission.variant))
            .bearer_auth(&identity.token)
            .json(&body)
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

        // Some backends acknowledge with `{level}`, some with nothing.
        let ack = response.json::<SubmissionAck>().await.unwrap_or_default();
        tracing::debug!(level = ?ack.level, "submission acknowledged");
        Ok(ack)
    }
}
