use std::{sync::Arc, time::Duration};

use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::config::{
    PlannerConfig, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT,
};
use crate::{
    error::{ErrorMessage, PlannerError, Result},
    services::{prompts, ContentGenerator, GeminiClient, GenerateContentRequest},
    types::{decode_itinerary, Itinerary, ItineraryRequest},
};

/// Itinerary generation service.
///
/// Holds only immutable state, so one planner can serve any number of
/// concurrent `generate` calls.
#[derive(Clone, Debug)]
pub struct ItineraryPlanner {
    generator: Arc<dyn ContentGenerator>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout: Duration,
}

impl ItineraryPlanner {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_generator(Arc::new(GeminiClient::new(api_key)))
    }

    /// Use any [`ContentGenerator`] in place of the Gemini HTTP client.
    pub fn with_generator(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: PlannerConfig) -> Self {
        let client = GeminiClient::new(config.api_key).with_base_url(config.base_url);
        Self::with_generator(Arc::new(client))
            .with_model(config.model)
            .with_temperature(config.temperature)
            .with_max_output_tokens(config.max_output_tokens)
            .with_timeout(config.timeout)
    }

    pub fn from_env() -> Result<Self> {
        PlannerConfig::from_env().map(Self::from_config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Plan a trip. Always resolves: an itinerary, or a message fit to show the user.
    pub async fn generate(
        &self,
        destination: &str,
        days: u32,
    ) -> std::result::Result<Itinerary, ErrorMessage> {
        self.try_generate(destination, days).await.map_err(|err| {
            error!(
                destination,
                days,
                code = err.error_code(),
                error = %err,
                "itinerary generation failed"
            );
            ErrorMessage::from(&err)
        })
    }

    /// Same as [`generate`](Self::generate) but keeps the detailed error.
    pub async fn try_generate(&self, destination: &str, days: u32) -> Result<Itinerary> {
        let request = ItineraryRequest::new(destination, days)?;
        let body = self.build_request(&request);

        info!(
            destination = request.destination(),
            days = request.days(),
            model = %self.model,
            "requesting itinerary"
        );

        let response = timeout(self.timeout, self.generator.generate_content(&body, self.timeout))
            .await
            .map_err(|_| PlannerError::Timeout(self.timeout))??;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = ?usage.prompt_token_count,
                output_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                finish_reason = ?response.finish_reason(),
                "generateContent usage"
            );
        }

        let text = response.into_text()?;
        let itinerary = decode_itinerary(&text)?;

        if itinerary.len() != request.days() as usize {
            warn!(
                requested = request.days(),
                returned = itinerary.len(),
                "itinerary length differs from requested day count"
            );
        }

        Ok(itinerary)
    }

    /// Assemble the `generateContent` body for a validated request.
    pub fn build_request(&self, request: &ItineraryRequest) -> GenerateContentRequest {
        GenerateContentRequest::new(self.model.as_str(), prompts::user_prompt(request))
            .with_system_instruction(prompts::system_instruction(request))
            .with_temperature(self.temperature)
            .with_max_output_tokens(self.max_output_tokens)
            .with_response_schema(Itinerary::response_schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FailureKind,
        services::{Candidate, Content, GenerateContentResponse, Part},
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum Reply {
        Text(String),
        Empty,
        Fail,
        Hang,
    }

    #[derive(Debug)]
    struct MockGenerator {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl MockGenerator {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn envelope(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part::text(text)],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            ..Default::default()
        }
    }

    #[async_trait]
    impl ContentGenerator for MockGenerator {
        async fn generate_content(
            &self,
            _request: &GenerateContentRequest,
            _timeout: Duration,
        ) -> Result<GenerateContentResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Text(text) => Ok(envelope(text)),
                Reply::Empty => Ok(GenerateContentResponse::default()),
                Reply::Fail => Err(PlannerError::Http("connection refused".to_string())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(GenerateContentResponse::default())
                }
            }
        }
    }

    fn two_days() -> String {
        json!([
            {"day": "Day 1 - Ancient Rome", "morning": "Tour the Colosseum.", "afternoon": "Walk the Roman Forum.", "night": "Dinner in Trastevere."},
            {"day": "Day 2 - Vatican", "morning": "Visit the Vatican Museums.", "afternoon": "See St. Peter's Basilica.", "night": "Gelato near the Trevi Fountain."}
        ])
        .to_string()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let generator = MockGenerator::new(Reply::Text(two_days()));
        let planner = ItineraryPlanner::with_generator(generator.clone());

        let itinerary = planner.generate("Rome", 2).await.unwrap();

        assert_eq!(itinerary.len(), 2);
        assert_eq!(itinerary[1].day, "Day 2 - Vatican");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_not_corrected() {
        let planner = ItineraryPlanner::with_generator(MockGenerator::new(Reply::Text(two_days())));
        let itinerary = planner.generate("Rome", 4).await.unwrap();
        assert_eq!(itinerary.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_envelope_is_format_failure() {
        let planner = ItineraryPlanner::with_generator(MockGenerator::new(Reply::Empty));
        let message = planner.generate("Tokyo", 5).await.unwrap_err();
        assert_eq!(message.kind(), FailureKind::Format);
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let planner = ItineraryPlanner::with_generator(MockGenerator::new(Reply::Fail));
        let message = planner.generate("Rome", 2).await.unwrap_err();

        assert_eq!(message.kind(), FailureKind::Transport);
        assert!(!message.as_str().contains("refused"));
    }

    #[tokio::test]
    async fn test_hung_provider_times_out() {
        let planner = ItineraryPlanner::with_generator(MockGenerator::new(Reply::Hang))
            .with_timeout(Duration::from_millis(50));

        let err = planner.try_generate("Rome", 2).await.unwrap_err();
        assert!(matches!(err, PlannerError::Timeout(d) if d == Duration::from_millis(50)));
        assert_eq!(ErrorMessage::from(err).kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_degenerate_input_never_dispatches() {
        let generator = MockGenerator::new(Reply::Text(two_days()));
        let planner = ItineraryPlanner::with_generator(generator.clone());

        let message = planner.generate("  ", 3).await.unwrap_err();
        assert_eq!(message.kind(), FailureKind::InvalidRequest);
        let message = planner.generate("Rome", 0).await.unwrap_err();
        assert_eq!(message.kind(), FailureKind::InvalidRequest);

        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn test_build_request_carries_contract() {
        let planner = ItineraryPlanner::with_generator(MockGenerator::new(Reply::Empty))
            .with_model("gemini-test")
            .with_temperature(0.25)
            .with_max_output_tokens(4096);
        let request = ItineraryRequest::new("Paris, France", 3).unwrap();

        let body = planner.build_request(&request);
        assert_eq!(body.model(), "gemini-test");

        let value = body.into_value();
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("3-day schedule for Paris, France"));
        assert!(value["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Markdown"));
        assert_eq!(value["generationConfig"]["temperature"], 0.25);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            value["generationConfig"]["responseSchema"],
            Itinerary::response_schema()
        );
    }

    #[test]
    fn test_generate_resolves_synchronously_with_block_on() {
        let planner = ItineraryPlanner::with_generator(MockGenerator::new(Reply::Text(
            "[{\"day\": \"Day 1\"}]".to_string(),
        )));

        let outcome = tokio_test::block_on(planner.generate("Oslo", 1));
        assert!(outcome.unwrap_err().is_format_failure());
    }

    #[test]
    fn test_from_config() {
        let mut config = PlannerConfig::new("key");
        config.model = "gemini-2.0-flash".to_string();
        config.timeout = Duration::from_secs(5);

        let planner = ItineraryPlanner::from_config(config);
        assert_eq!(planner.model(), "gemini-2.0-flash");
        assert_eq!(planner.timeout(), Duration::from_secs(5));
    }
}
