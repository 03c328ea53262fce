//! Gemini AI client for viral highlight strategies.

use async_trait::async_trait;
use clipgen_models::{AggregateRequest, ProcessingResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::error::{StrategyError, StrategyResult};
use crate::prompt::{build_prompt, validate_request};
use crate::schema::{parse_strategy_text, response_schema};

/// Produces a strategy for an aggregate request.
///
/// Implementations report every failure as a single [`StrategyError`]; no
/// retry and no partial result.
#[async_trait]
pub trait StrategyClient: Send + Sync {
    async fn request_strategy(
        &self,
        aggregate: &AggregateRequest,
        user_prompt: Option<&str>,
    ) -> StrategyResult<ProcessingResult>;
}

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Forces a JSON answer shaped by the strategy schema.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, joined across parts.
    fn into_text(self) -> StrategyResult<String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(StrategyError::contract(format!(
                "Gemini returned no candidates: {}",
                reason
            )));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(StrategyError::contract(format!(
                "No content in Gemini response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> StrategyResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| StrategyError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a client from `GEMINI_API_KEY` and friends.
    pub fn from_env() -> StrategyResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// POST the prompt and return the raw candidate text.
    async fn generate(&self, prompt: String) -> StrategyResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StrategyError::from_http_status(status, body));
        }

        let envelope: GenerateResponse = response.json().await.map_err(|e| {
            StrategyError::contract(format!("Response is not a generateContent envelope: {}", e))
        })?;

        envelope.into_text()
    }
}

#[async_trait]
impl StrategyClient for GeminiClient {
    async fn request_strategy(
        &self,
        aggregate: &AggregateRequest,
        user_prompt: Option<&str>,
    ) -> StrategyResult<ProcessingResult> {
        validate_request(aggregate, user_prompt)?;

        let prompt = build_prompt(aggregate, user_prompt);
        info!(
            model = %self.config.model,
            name = %aggregate.name,
            total_duration = aggregate.total_duration,
            "Requesting highlight strategy"
        );
        debug!("Prompt:\n{}", prompt);

        let text = self.generate(prompt).await.map_err(|e| {
            warn!(kind = %e.kind(), status = e.http_status(), "Gemini request failed: {}", e);
            e
        })?;

        let strategy = parse_strategy_text(&text).map_err(|e| {
            warn!("Gemini response rejected: {}", e);
            e
        })?;

        info!(
            segments = strategy.highlight_segments.len(),
            viral_score = strategy.viral_score,
            "Received highlight strategy"
        );
        Ok(ProcessingResult::new(strategy, aggregate.total_duration))
    }
}
