/*!
 * Translation engine abstraction.
 *
 * This module defines the uniform capability set every engine variant
 * implements and the factory that selects a variant from configuration:
 *
 * - `mock`: deterministic engine for development and tests
 * - `openai`: network-backed engine with retry, timeout, and caching
 *
 * New providers are new variants behind the factory, never new branches
 * scattered through the job handlers.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_config::{EngineConfig, EngineProvider};
use crate::errors::EngineError;

pub mod chunk;
pub mod mock;
pub mod openai;
pub mod prompts;
pub mod response;

pub use mock::MockEngine;
pub use openai::OpenAiEngine;

/// Confidence assigned when the model did not report one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// One input line for batch translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// Segment index within the project, the matching key for results
    pub idx: i64,
    /// Source text to translate
    pub text: String,
}

/// One translated line, matched to its input by index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTranslation {
    /// Segment index this result answers
    pub idx: i64,
    /// Translated text; empty when the model skipped the index
    pub text: String,
    /// Model confidence in 0.0..=1.0
    pub confidence: f64,
}

/// One alternative phrasing for a single segment
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Suggested text
    pub text: String,
    /// Relative preference score
    pub score: f64,
    /// Why this variant was produced (style label or provider note)
    pub reason: String,
}

/// One item of a consistency window: identity, source, and current draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyItem {
    /// Segment id (not index: corrections are keyed by identity)
    pub id: i64,
    /// Original source text
    pub source: String,
    /// Current draft translation under review
    pub draft: String,
}

/// Billing identity of an engine, for the usage ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageMeta {
    /// Ledger provider key
    pub provider: &'static str,
    /// Model identifier used for cost lookup
    pub model: String,
}

/// Uniform contract implemented by every engine variant
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate a batch of segments.
    ///
    /// Returns exactly one result per input line, matched by index; an index
    /// the model skipped yields an empty-text placeholder, never a missing
    /// entry.
    async fn translate_batch(
        &self,
        segments: &[SourceLine],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<LineTranslation>, EngineError>;

    /// Suggest up to `n` alternative phrasings for one segment.
    ///
    /// An irrecoverable response yields an empty list, not an error.
    async fn suggest_variants(
        &self,
        source_text: &str,
        n: usize,
        style: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Variant>, EngineError>;

    /// Run one consistency window, returning corrected text keyed by
    /// segment id.
    ///
    /// Only ids the engine explicitly returns are corrections; omitted ids
    /// are left untouched. Partial success is valid and common.
    async fn consistency_pass(
        &self,
        items: &[ConsistencyItem],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<HashMap<i64, String>, EngineError>;

    /// Billing identity for usage accounting; None for engines that cost
    /// nothing to call.
    fn usage_meta(&self) -> Option<UsageMeta> {
        None
    }
}

/// Construct the engine variant selected by configuration
pub fn create_engine(config: &EngineConfig) -> Result<Arc<dyn TranslationEngine>, EngineError> {
    match config.provider {
        EngineProvider::Mock => Ok(Arc::new(MockEngine::new())),
        EngineProvider::OpenAi => Ok(Arc::new(OpenAiEngine::new(config)?)),
    }
}
