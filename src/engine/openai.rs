/*!
 * Network-backed engine speaking the OpenAI chat-completion wire contract.
 *
 * Adds to the base contract: bounded retry with linear backoff, a per-call
 * timeout enforced by the HTTP client, and an in-memory content-addressed
 * response cache so identical batch requests within a process lifetime are
 * not re-billed. The cache has no eviction and carries no correctness
 * obligation; clearing it only costs money.
 */

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{
    ConsistencyItem, DEFAULT_CONFIDENCE, LineTranslation, SourceLine, TranslationEngine,
    UsageMeta, Variant, chunk, prompts, response,
};
use crate::app_config::EngineConfig;
use crate::errors::EngineError;

/// Default chat-completion endpoint
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Chat-completion request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model identifier
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum output tokens
    max_tokens: u32,
    /// System directive plus user prompt
    messages: Vec<ChatMessage>,
}

/// One message of the exchange
#[derive(Debug, Serialize)]
struct ChatMessage {
    /// Role of the message sender (system, user)
    role: &'static str,
    /// Content of the message
    content: String,
}

/// Chat-completion response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Completion choices; only the first is used
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// The generated message
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    /// The text content of the generated message
    content: Option<String>,
}

/// Network-backed translation engine
pub struct OpenAiEngine {
    /// HTTP client; carries the per-call timeout
    client: Client,
    /// Bearer token for authentication
    api_key: String,
    /// Model identifier sent with every request
    model: String,
    /// Endpoint URL
    endpoint: String,
    /// Maximum attempts per call
    max_retries: u32,
    /// Base delay for linear backoff (attempt x delay)
    retry_backoff: Duration,
    /// Character budget for one batch-translation chunk
    max_batch_chars: usize,
    /// Maximum output tokens requested per call
    max_tokens: u32,
    /// Content-addressed cache of parsed batch results, process-scoped
    cache: RwLock<HashMap<String, Vec<LineTranslation>>>,
}

impl OpenAiEngine {
    /// Create a new engine from configuration.
    ///
    /// A missing API key is a configuration error caught here, before any
    /// job can pick the engine up.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        if config.api_key.trim().is_empty() {
            return Err(EngineError::MissingApiKey("openai".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        let endpoint = if config.endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            config.endpoint.trim_end_matches('/').to_string()
        };

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint,
            max_retries: config.max_retries.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            max_batch_chars: config.max_batch_chars,
            max_tokens: config.max_tokens,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Cache key for one chunk: hash of contents, language pair, and model
    fn cache_key(&self, chunk: &[SourceLine], source_lang: &str, target_lang: &str) -> String {
        let mut hasher = Sha256::new();
        for line in chunk {
            hasher.update(line.idx.to_le_bytes());
            hasher.update(line.text.as_bytes());
            hasher.update([0]);
        }
        hasher.update(source_lang.as_bytes());
        hasher.update([0]);
        hasher.update(target_lang.as_bytes());
        hasher.update([0]);
        hasher.update(self.model.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Issue one chat call with bounded retry and linear backoff.
    ///
    /// Only transient errors are retried; configuration errors surface on
    /// the first attempt.
    async fn chat(&self, prompt: &str, temperature: f32) -> Result<String, EngineError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            debug!(
                "Calling model={} attempt={} prompt_chars={}",
                self.model,
                attempt,
                prompt.len()
            );

            match self.chat_once(prompt, temperature).await {
                Ok(content) => return Ok(content),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_backoff * attempt;
                    warn!(
                        "Chat attempt {} failed ({}), retrying in {:?}",
                        attempt, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Issue a single chat call without retry
    async fn chat_once(&self, prompt: &str, temperature: f32) -> Result<String, EngineError> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_DIRECTIVE.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response body".to_string());
            return Err(EngineError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| EngineError::ParseError("empty completion response".to_string()))
    }
}

#[async_trait]
impl TranslationEngine for OpenAiEngine {
    async fn translate_batch(
        &self,
        segments: &[SourceLine],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<LineTranslation>, EngineError> {
        let chunks = chunk::chunk_by_chars(segments, self.max_batch_chars, |line| line.text.as_str());
        let mut results = Vec::with_capacity(segments.len());

        for batch in &chunks {
            let key = self.cache_key(batch, source_lang, target_lang);
            if let Some(hit) = self.cache.read().get(&key).cloned() {
                debug!("Cache hit for batch of {} lines", batch.len());
                results.extend(hit);
                continue;
            }

            let prompt = prompts::build_batch_prompt(batch, source_lang, target_lang);
            let content = self.chat(&prompt, 0.3).await?;
            let parsed = response::parse_batch_response(&content, batch);

            self.cache.write().insert(key, parsed.clone());
            results.extend(parsed);
        }
        Ok(results)
    }

    async fn suggest_variants(
        &self,
        source_text: &str,
        n: usize,
        style: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Variant>, EngineError> {
        let prompt = prompts::build_variants_prompt(source_text, n, style, source_lang, target_lang);
        let content = self.chat(&prompt, 0.6).await?;

        let Some(parsed) = response::json_from_prose(&content) else {
            return Ok(Vec::new());
        };
        let Some(variants) = parsed.get("variants").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        Ok(variants
            .iter()
            .take(n)
            .filter_map(|entry| {
                let text = entry.get("text").and_then(Value::as_str)?;
                Some(Variant {
                    text: text.to_string(),
                    score: entry
                        .get("confidence")
                        .and_then(Value::as_f64)
                        .unwrap_or(DEFAULT_CONFIDENCE),
                    reason: style.to_string(),
                })
            })
            .collect())
    }

    async fn consistency_pass(
        &self,
        items: &[ConsistencyItem],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<HashMap<i64, String>, EngineError> {
        let prompt = prompts::build_consistency_prompt(items, source_lang, target_lang);
        if prompt.len() > prompts::CONSISTENCY_PROMPT_CEILING {
            return Err(EngineError::PromptTooLarge {
                size: prompt.len(),
                ceiling: prompts::CONSISTENCY_PROMPT_CEILING,
            });
        }

        let content = self.chat(&prompt, 0.2).await?;

        let Some(parsed) = response::json_from_prose(&content) else {
            return Ok(HashMap::new());
        };
        let Some(lines) = parsed.get("lines").and_then(Value::as_array) else {
            return Ok(HashMap::new());
        };

        let mut corrections = HashMap::new();
        for entry in lines {
            let (Some(id), Some(text)) = (
                entry.get("id").and_then(Value::as_i64),
                entry.get("text").and_then(Value::as_str),
            ) else {
                continue;
            };
            corrections.insert(id, text.to_string());
        }
        Ok(corrections)
    }

    fn usage_meta(&self) -> Option<UsageMeta> {
        Some(UsageMeta {
            provider: "openai",
            model: self.model.clone(),
        })
    }
}
