/*!
 * Deterministic mock engine for development and tests.
 *
 * Translations are the source text prefixed with the language pair, so a
 * whole pipeline can run offline and every output is predictable.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;

use super::{ConsistencyItem, LineTranslation, SourceLine, TranslationEngine, Variant};
use crate::errors::EngineError;

/// Confidence reported for every mock translation
const MOCK_CONFIDENCE: f64 = 0.55;

/// Engine that fabricates plausible output without any network calls
#[derive(Debug, Default)]
pub struct MockEngine;

impl MockEngine {
    /// Create a new mock engine
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    async fn translate_batch(
        &self,
        segments: &[SourceLine],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<LineTranslation>, EngineError> {
        debug!(
            "Mock translating {} segments ({} -> {})",
            segments.len(),
            source_lang,
            target_lang
        );
        Ok(segments
            .iter()
            .map(|segment| LineTranslation {
                idx: segment.idx,
                text: format!("[{}->{}] {}", source_lang, target_lang, segment.text),
                confidence: MOCK_CONFIDENCE,
            })
            .collect())
    }

    async fn suggest_variants(
        &self,
        source_text: &str,
        n: usize,
        _style: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<Vec<Variant>, EngineError> {
        let base = source_text.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok((0..n)
            .map(|i| Variant {
                text: format!("{} (alt {})", base, i + 1),
                score: 0.5 - i as f64 * 0.05,
                reason: "Mock suggestion".to_string(),
            })
            .collect())
    }

    async fn consistency_pass(
        &self,
        items: &[ConsistencyItem],
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<HashMap<i64, String>, EngineError> {
        // The mock considers every draft already consistent; omitting every
        // id is a valid partial result per the engine contract.
        debug!("Mock consistency pass over {} items", items.len());
        Ok(HashMap::new())
    }
}
