/*!
 * Tests for token estimation, cost conversion, and month keys
 */

use chrono::TimeZone;

use transub::errors::UsageError;
use transub::usage::{
    estimate_chars_from_segments, estimate_cost, estimate_tokens_from_segments,
    estimate_tokens_from_text, month_key,
};

use crate::common::repo_with_project;

#[test]
fn test_estimateTokensFromText_withEmptyText_shouldBeZero() {
    assert_eq!(estimate_tokens_from_text(""), 0);
}

#[test]
fn test_estimateTokensFromText_shouldRoundUp() {
    // 4 chars per token, conservatively rounded up
    assert_eq!(estimate_tokens_from_text("abcd"), 1);
    assert_eq!(estimate_tokens_from_text("abcde"), 2);
}

#[tokio::test]
async fn test_estimateTokensFromSegments_shouldSkipMissingFields() {
    let (repo, project) = repo_with_project(3).await.unwrap();
    let segments = repo.list_segments(project.id).await.unwrap();

    // No drafts written: draft-based estimate is zero, source-based is not
    assert_eq!(estimate_tokens_from_segments(&segments, |s| s.draft_text.as_deref()), 0);
    assert!(estimate_tokens_from_segments(&segments, |s| Some(&s.source_text)) > 0);
}

#[tokio::test]
async fn test_estimateCharsFromSegments_shouldSumRawLengths() {
    let (repo, project) = repo_with_project(2).await.unwrap();
    let segments = repo.list_segments(project.id).await.unwrap();

    let expected: u64 = segments
        .iter()
        .map(|s| s.source_text.chars().count() as u64)
        .sum();
    assert_eq!(
        estimate_chars_from_segments(&segments, |s| Some(&s.source_text)),
        expected
    );
    assert_eq!(
        estimate_chars_from_segments(&segments, |s| s.final_text.as_deref()),
        0
    );
}

#[test]
fn test_estimateCost_withKnownModel_shouldComputeRates() {
    let cost = estimate_cost("gpt-4.1-mini", 1000, 1000).unwrap();
    assert!((cost.input_usd - 0.000_15).abs() < 1e-12);
    assert!((cost.output_usd - 0.000_6).abs() < 1e-12);
    assert!((cost.total_usd - 0.000_75).abs() < 1e-12);
}

#[test]
fn test_estimateCost_withUnknownModel_shouldFailImmediately() {
    let result = estimate_cost("gpt-nonexistent", 100, 100);
    assert!(matches!(result, Err(UsageError::UnknownModel(_))));
}

#[test]
fn test_monthKey_shouldFormatYearAndMonth() {
    let at = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
    assert_eq!(month_key(at), "2024-03");
}
