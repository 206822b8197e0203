/*!
 * Tests for the engine variants and the selection factory
 */

use transub::app_config::{EngineConfig, EngineProvider};
use transub::engine::{ConsistencyItem, MockEngine, SourceLine, TranslationEngine, create_engine};
use transub::errors::EngineError;

fn source_lines(count: usize) -> Vec<SourceLine> {
    (0..count)
        .map(|i| SourceLine {
            idx: i as i64,
            text: format!("Line {}", i),
        })
        .collect()
}

#[tokio::test]
async fn test_mockTranslateBatch_shouldReturnOneResultPerInput() {
    let engine = MockEngine::new();
    let lines = source_lines(7);

    let results = engine.translate_batch(&lines, "en", "fi").await.unwrap();

    assert_eq!(results.len(), 7);
    for (line, result) in lines.iter().zip(&results) {
        assert_eq!(result.idx, line.idx);
        assert_eq!(result.text, format!("[en->fi] {}", line.text));
        assert!(result.confidence > 0.0);
    }
}

#[tokio::test]
async fn test_mockTranslateBatch_withEmptyInput_shouldReturnEmpty() {
    let engine = MockEngine::new();
    let results = engine.translate_batch(&[], "en", "fi").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_mockSuggestVariants_shouldReturnRequestedCount() {
    let engine = MockEngine::new();
    let variants = engine
        .suggest_variants("Hello   there", 3, "neutral", "en", "fi")
        .await
        .unwrap();

    assert_eq!(variants.len(), 3);
    // Whitespace is collapsed and scores decrease
    assert_eq!(variants[0].text, "Hello there (alt 1)");
    assert!(variants[0].score > variants[2].score);
}

#[tokio::test]
async fn test_mockConsistencyPass_shouldReturnNoCorrections() {
    let engine = MockEngine::new();
    let corrections = engine.consistency_pass(&[], "en", "fi").await.unwrap();
    assert!(corrections.is_empty());
}

#[test]
fn test_createEngine_withMockProvider_shouldHaveNoBillingIdentity() {
    let config = EngineConfig::default();
    let engine = create_engine(&config).unwrap();
    assert!(engine.usage_meta().is_none());
}

#[test]
fn test_createEngine_withOpenAiAndNoKey_shouldFailFast() {
    let config = EngineConfig {
        provider: EngineProvider::OpenAi,
        ..EngineConfig::default()
    };

    let result = create_engine(&config);
    assert!(matches!(result, Err(EngineError::MissingApiKey(_))));
}

#[tokio::test]
async fn test_openAiConsistencyPass_withOversizedPrompt_shouldAbortWithoutRetry() {
    let config = EngineConfig {
        provider: EngineProvider::OpenAi,
        api_key: "sk-test".to_string(),
        ..EngineConfig::default()
    };
    let engine = create_engine(&config).unwrap();

    // Enough long drafts to blow the 12k-character consistency ceiling;
    // the size check fires before any network call is attempted.
    let items: Vec<ConsistencyItem> = (0..200)
        .map(|i| ConsistencyItem {
            id: i,
            source: format!("Source line {} with a reasonably long body of text", i),
            draft: format!("Draft line {} with a reasonably long body of text", i),
        })
        .collect();

    let result = engine.consistency_pass(&items, "en", "fi").await;
    assert!(matches!(result, Err(EngineError::PromptTooLarge { .. })));
}

#[test]
fn test_createEngine_withOpenAiAndKey_shouldReportBillingIdentity() {
    let config = EngineConfig {
        provider: EngineProvider::OpenAi,
        api_key: "sk-test".to_string(),
        ..EngineConfig::default()
    };

    let engine = create_engine(&config).unwrap();
    let meta = engine.usage_meta().expect("openai engine should be billed");
    assert_eq!(meta.provider, "openai");
    assert_eq!(meta.model, "gpt-4.1-mini");
}
