/*!
 * Scripted engine implementations for exercising handler edge cases.
 *
 * The library's own mock engine is deliberately deterministic and benign;
 * these variants simulate billing identities, stray results, and failing
 * windows.
 */

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use transub::engine::{
    ConsistencyItem, LineTranslation, MockEngine, SourceLine, TranslationEngine, UsageMeta,
    Variant,
};
use transub::errors::EngineError;

/// Mock engine that reports a billing identity, for usage accounting tests
pub struct BilledEngine {
    inner: MockEngine,
    model: String,
}

impl BilledEngine {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            inner: MockEngine::new(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TranslationEngine for BilledEngine {
    async fn translate_batch(
        &self,
        segments: &[SourceLine],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<LineTranslation>, EngineError> {
        self.inner
            .translate_batch(segments, source_lang, target_lang)
            .await
    }

    async fn suggest_variants(
        &self,
        source_text: &str,
        n: usize,
        style: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Variant>, EngineError> {
        self.inner
            .suggest_variants(source_text, n, style, source_lang, target_lang)
            .await
    }

    async fn consistency_pass(
        &self,
        items: &[ConsistencyItem],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<HashMap<i64, String>, EngineError> {
        self.inner
            .consistency_pass(items, source_lang, target_lang)
            .await
    }

    fn usage_meta(&self) -> Option<UsageMeta> {
        Some(UsageMeta {
            provider: "openai",
            model: self.model.clone(),
        })
    }
}

/// Engine whose batch results include an index no input segment carries
pub struct StrayIdxEngine;

#[async_trait]
impl TranslationEngine for StrayIdxEngine {
    async fn translate_batch(
        &self,
        segments: &[SourceLine],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<LineTranslation>, EngineError> {
        let mut results = MockEngine::new()
            .translate_batch(segments, source_lang, target_lang)
            .await?;
        results.push(LineTranslation {
            idx: 9999,
            text: "stray result".to_string(),
            confidence: 0.1,
        });
        Ok(results)
    }

    async fn suggest_variants(
        &self,
        _source_text: &str,
        _n: usize,
        _style: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<Vec<Variant>, EngineError> {
        Ok(Vec::new())
    }

    async fn consistency_pass(
        &self,
        _items: &[ConsistencyItem],
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<HashMap<i64, String>, EngineError> {
        Ok(HashMap::new())
    }
}

/// Consistency engine returning a fixed correction map, optionally failing
/// on selected calls (1-based call numbers)
pub struct ScriptedConsistencyEngine {
    corrections: HashMap<i64, String>,
    fail_on: HashSet<usize>,
    calls: AtomicUsize,
}

impl ScriptedConsistencyEngine {
    pub fn new(corrections: HashMap<i64, String>) -> Self {
        Self {
            corrections,
            fail_on: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.fail_on = calls.into_iter().collect();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationEngine for ScriptedConsistencyEngine {
    async fn translate_batch(
        &self,
        segments: &[SourceLine],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<LineTranslation>, EngineError> {
        MockEngine::new()
            .translate_batch(segments, source_lang, target_lang)
            .await
    }

    async fn suggest_variants(
        &self,
        _source_text: &str,
        _n: usize,
        _style: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<Vec<Variant>, EngineError> {
        Ok(Vec::new())
    }

    async fn consistency_pass(
        &self,
        _items: &[ConsistencyItem],
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<HashMap<i64, String>, EngineError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&call) {
            return Err(EngineError::RequestFailed(format!(
                "scripted failure on call {}",
                call
            )));
        }
        Ok(self.corrections.clone())
    }
}
