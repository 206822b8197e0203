/*!
 * Tests for the two chunking policies
 */

use transub::engine::chunk::{chunk_by_chars, window_ranges};

fn texts(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_chunkByChars_withEmptyInput_shouldProduceNoChunks() {
    let items: Vec<String> = Vec::new();
    let chunks = chunk_by_chars(&items, 10, |s| s.as_str());
    assert!(chunks.is_empty());
}

#[test]
fn test_chunkByChars_withItemsUnderBudget_shouldAccumulate() {
    let items = texts(&["abc", "def", "gh"]);
    let chunks = chunk_by_chars(&items, 8, |s| s.as_str());
    // "abc" + "def" = 6 chars fits; adding "gh" would also fit (8)
    assert_eq!(chunks, vec![texts(&["abc", "def", "gh"])]);
}

#[test]
fn test_chunkByChars_whenBudgetExceeded_shouldStartNewChunk() {
    let items = texts(&["abcd", "efgh", "ijkl"]);
    let chunks = chunk_by_chars(&items, 8, |s| s.as_str());
    assert_eq!(chunks, vec![texts(&["abcd", "efgh"]), texts(&["ijkl"])]);
}

#[test]
fn test_chunkByChars_withOversizedItem_shouldGiveItOwnChunk() {
    let items = texts(&["ab", "this line alone blows the budget", "cd"]);
    let chunks = chunk_by_chars(&items, 10, |s| s.as_str());
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1], texts(&["this line alone blows the budget"]));
}

#[test]
fn test_chunkByChars_concatenation_shouldReconstructInput() {
    let items: Vec<String> = (0..57).map(|i| format!("segment number {}", i)).collect();
    let chunks = chunk_by_chars(&items, 100, |s| s.as_str());

    assert!(chunks.iter().all(|chunk| !chunk.is_empty()));
    let reconstructed: Vec<String> = chunks.into_iter().flatten().collect();
    assert_eq!(reconstructed, items);
}

#[test]
fn test_windowRanges_shouldStepByWindowMinusOverlap() {
    let ranges = window_ranges(10, 4, 1);
    assert_eq!(ranges, vec![0..4, 3..7, 6..10, 9..10]);
}

#[test]
fn test_windowRanges_withLenUnderWindow_shouldProduceSingleWindow() {
    let ranges = window_ranges(5, 100, 15);
    assert_eq!(ranges, vec![0..5]);
}

#[test]
fn test_windowRanges_withEmptyInput_shouldProduceNoWindows() {
    assert!(window_ranges(0, 100, 15).is_empty());
}

#[test]
fn test_windowRanges_shouldCoverEveryIndex() {
    let ranges = window_ranges(237, 100, 15);
    let mut covered = vec![false; 237];
    for range in ranges {
        for i in range {
            covered[i] = true;
        }
    }
    assert!(covered.into_iter().all(|c| c));
}

#[test]
#[should_panic(expected = "window must be larger than overlap")]
fn test_windowRanges_withOverlapNotBelowWindow_shouldPanic() {
    window_ranges(10, 5, 5);
}
