//! Reasoning service client.
//!
//! The pipeline talks to its reasoning collaborator through the
//! [`Reasoner`] trait, so tests substitute a stub and the orchestrator
//! never knows which vendor answered. The production implementation calls
//! OpenRouter's chat completions endpoint and logs per-query token usage
//! with a cost extrapolation, which is the number that actually decides
//! whether a model is affordable at catalog scale.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::product::Product;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "openai/gpt-5-nano";

/// Prices per million tokens (model, input, output). Output pricing also
/// covers reasoning tokens.
const MODEL_PRICES: &[(&str, f64, f64)] = &[
    ("google/gemini-2.0-flash-lite-001", 0.075, 0.30),
    ("google/gemini-2.5-flash-lite", 0.10, 0.40),
    ("google/gemini-3-flash-preview", 0.50, 3.00),
    ("google/gemini-3-pro-preview", 2.00, 12.00),
    ("openai/gpt-5", 1.25, 10.00),
    ("openai/gpt-5-mini", 0.25, 2.00),
    ("openai/gpt-5-nano", 0.05, 0.40),
];

/// The external reasoning collaborator.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Reconcile one document's evidence into a schema-conforming product.
    async fn reconcile(&self, prompt: &str) -> Result<Product>;
}

/// OpenRouter-backed reasoner.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    /// Build a client for `model`, reading the API key from the
    /// `OPEN_ROUTER_API_KEY` environment variable.
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPEN_ROUTER_API_KEY")
            .map_err(|_| Error::ClientError("OPEN_ROUTER_API_KEY not set".to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| Error::ClientError(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
        })
    }

    fn log_usage(&self, response: &ChatResponse) {
        let Some(usage) = &response.usage else {
            warn!("no usage data in completion response");
            return;
        };
        let model = response.model.as_deref().unwrap_or(&self.model);
        let reasoning = usage
            .completion_tokens_details
            .as_ref()
            .map_or(0, |d| d.reasoning_tokens);
        let (input_price, output_price) = model_prices(model);

        let single_total = (usage.prompt_tokens as f64) / 1_000_000.0 * input_price
            + (usage.completion_tokens as f64) / 1_000_000.0 * output_price
            + (reasoning as f64) / 1_000_000.0 * output_price;
        let million_cost = single_total * 1_000_000.0;

        info!(
            "token usage for {model}: input={}, output={}, reasoning={reasoning} | \
             this query: ${single_total:.6} | 1M queries: ${million_cost:.2} | \
             10M queries: ${:.2}",
            usage.prompt_tokens,
            usage.completion_tokens,
            million_cost * 10.0
        );
    }
}

#[async_trait]
impl Reasoner for OpenRouterClient {
    async fn reconcile(&self, prompt: &str) -> Result<Product> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "system",
                content: prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{OPENROUTER_BASE_URL}/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::CompletionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::CompletionError(format!(
                "completion endpoint returned {}",
                response.status()
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::CompletionError(e.to_string()))?;
        self.log_usage(&reply);

        let content = reply
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| Error::CompletionError("completion reply had no choices".to_string()))?;

        parse_product_reply(content)
    }
}

/// Parse a reply into a product, tolerating a Markdown code fence around
/// the JSON. Anything that does not deserialize to the schema is a schema
/// failure.
pub fn parse_product_reply(content: &str) -> Result<Product> {
    let json = strip_code_fences(content);
    serde_json::from_str(json).map_err(|e| Error::SchemaError(e.to_string()))
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn model_prices(model: &str) -> (f64, f64) {
    MODEL_PRICES
        .iter()
        .find(|(name, _, _)| *name == model)
        .map_or((0.0, 0.0), |(_, input, output)| (*input, *output))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    completion_tokens_details: Option<TokenDetails>,
}

#[derive(Deserialize, Default)]
struct TokenDetails {
    #[serde(default)]
    reasoning_tokens: u64,
}
