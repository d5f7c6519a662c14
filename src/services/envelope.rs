use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// A turn of conversation: a role and its parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// System instructions carry no role.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Envelope returned by `models/{model}:generateContent`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }

    /// Take the text payload, or explain why there is none.
    pub fn into_text(self) -> Result<String> {
        if let Some(text) = self.first_text() {
            return Ok(text.to_string());
        }

        let block_reason = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);
        match block_reason {
            Some(reason) => Err(PlannerError::Blocked(reason)),
            None => Err(PlannerError::MissingPayload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_first_text_of_first_candidate() {
        let response = parse(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "[1]"}, {"text": "[2]"}]}, "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "[3]"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 300, "totalTokenCount": 420}
        }));

        assert_eq!(response.first_text(), Some("[1]"));
        assert_eq!(response.finish_reason(), Some("STOP"));
        assert_eq!(
            response.usage_metadata.as_ref().unwrap().total_token_count,
            Some(420)
        );
        assert_eq!(response.into_text().unwrap(), "[1]");
    }

    #[test]
    fn test_zero_candidates_is_missing_payload() {
        let response = parse(json!({"candidates": []}));
        assert!(response.first_text().is_none());
        assert!(matches!(
            response.into_text(),
            Err(PlannerError::MissingPayload)
        ));

        let response = parse(json!({}));
        assert!(matches!(
            response.into_text(),
            Err(PlannerError::MissingPayload)
        ));
    }

    #[test]
    fn test_missing_parts_or_text() {
        for value in [
            json!({"candidates": [{"finishReason": "MAX_TOKENS"}]}),
            json!({"candidates": [{"content": {"role": "model"}}]}),
            json!({"candidates": [{"content": {"parts": [{}]}}]}),
        ] {
            assert!(parse(value).into_text().is_err());
        }
    }

    #[test]
    fn test_blocked_prompt() {
        let response = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        match response.into_text() {
            Err(PlannerError::Blocked(reason)) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected blocked prompt, got {other:?}"),
        }
    }

    #[test]
    fn test_content_serialization() {
        let user = serde_json::to_value(Content::user("hi")).unwrap();
        assert_eq!(user, json!({"role": "user", "parts": [{"text": "hi"}]}));

        let system = serde_json::to_value(Content::instruction("rules")).unwrap();
        assert_eq!(system, json!({"parts": [{"text": "rules"}]}));
    }
}
