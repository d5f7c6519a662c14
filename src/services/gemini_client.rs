use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{envelope::GenerateContentResponse, request::GenerateContentRequest, ContentGenerator};
use crate::error::{PlannerError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini `generateContent` endpoint. One attempt per call.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> Result<GenerateContentResponse> {
        let url = build_generate_url(&self.base_url, request.model());
        debug!(%url, model = request.model(), "dispatching generateContent");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|err| transport_error(err, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(err, timeout))?;

        if !status.is_success() {
            let message = provider_message(&body).unwrap_or_else(|| body.clone());
            warn!(status = status.as_u16(), %message, "generateContent returned an error status");
            return Err(PlannerError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Value = serde_json::from_str(&body).map_err(|err| {
            PlannerError::Format(format!("unparsable response envelope: {err}"))
        })?;

        if let Some(message) = provider_message_from_value(&envelope) {
            return Err(PlannerError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_value(envelope)
            .map_err(|err| PlannerError::Format(format!("unexpected response envelope: {err}")))
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> PlannerError {
    if err.is_timeout() {
        PlannerError::Timeout(timeout)
    } else {
        PlannerError::from(err)
    }
}

fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(provider_message_from_value)
}

fn provider_message_from_value(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    Some(
        error
            .get("message")
            .and_then(|message| message.as_str())
            .map(|message| message.to_string())
            .unwrap_or_else(|| error.to_string()),
    )
}

fn build_generate_url(base_url: &str, model: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with(":generateContent") {
        trimmed.to_string()
    } else {
        format!("{}/models/{}:generateContent", trimmed, model)
    }
}
