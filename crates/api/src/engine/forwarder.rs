//! Notification of the external processing tier.
//!
//! After a job is stored locally, [`ProcessingTier::forward`] tells the tier
//! about it with a single bounded-timeout POST. Forwarding never fails the
//! submission: every failure is folded into a [`ForwardOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use seekreap_core::forwarding::{extract_correlation_id, ForwardOutcome};
use seekreap_core::types::DbId;

/// Payload sent to `<PROCESSING_TIER_URL>/jobs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardRequest {
    pub job_id: DbId,
    /// Legacy creator ID, as known to the tier.
    pub creator_id: String,
    pub content_id: String,
    pub job_type: String,
    pub params: serde_json::Value,
}

/// The external tier that performs the actual analysis.
#[async_trait]
pub trait ProcessingTier: Send + Sync {
    async fn forward(&self, request: &ForwardRequest) -> ForwardOutcome;
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single forward attempt.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The tier returned a non-2xx status code.
    #[error("Processing tier returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// HttpProcessingTier
// ---------------------------------------------------------------------------

/// Forwards jobs over HTTP.
pub struct HttpProcessingTier {
    client: reqwest::Client,
    jobs_url: String,
}

impl HttpProcessingTier {
    /// Build a client for the tier at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            jobs_url: format!("{}/jobs", base_url.trim_end_matches('/')),
        })
    }

    pub fn jobs_url(&self) -> &str {
        &self.jobs_url
    }

    /// Execute the POST and return the parsed response body, if any.
    async fn try_send(
        &self,
        request: &ForwardRequest,
    ) -> Result<Option<serde_json::Value>, ForwardError> {
        let response = self.client.post(&self.jobs_url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(ForwardError::HttpStatus(response.status().as_u16()));
        }
        // A 2xx without a JSON body is still an acceptance.
        Ok(response.json::<serde_json::Value>().await.ok())
    }
}

#[async_trait]
impl ProcessingTier for HttpProcessingTier {
    async fn forward(&self, request: &ForwardRequest) -> ForwardOutcome {
        match self.try_send(request).await {
            Ok(body) => ForwardOutcome::Forwarded {
                correlation_id: body.as_ref().and_then(extract_correlation_id),
            },
            Err(ForwardError::HttpStatus(code)) => ForwardOutcome::Rejected {
                reason: format!("HTTP {code}"),
            },
            Err(e) => ForwardOutcome::Unreachable {
                reason: e.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// DisabledProcessingTier
// ---------------------------------------------------------------------------

/// Used when `PROCESSING_TIER_URL` is unset.
pub struct DisabledProcessingTier;

#[async_trait]
impl ProcessingTier for DisabledProcessingTier {
    async fn forward(&self, _request: &ForwardRequest) -> ForwardOutcome {
        ForwardOutcome::NotAttempted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
