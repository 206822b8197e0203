/*!
 * Chunking policies for feeding segments to an engine.
 *
 * Two distinct policies live here and must not be confused:
 *
 * - Character-budget chunking groups items for independent batch translation
 *   calls. Chunk boundaries carry no semantic meaning.
 * - Overlapping sliding windows slice items for consistency passes, where the
 *   overlap gives terms near a boundary surrounding context from both sides.
 */

use std::ops::Range;

/// Group items into chunks whose designated text fields sum to at most
/// `budget` characters.
///
/// An item that alone exceeds the budget still gets its own one-item chunk;
/// items are never dropped or split. Concatenating the chunks reproduces the
/// input order exactly, and no chunk is empty.
pub fn chunk_by_chars<T, F>(items: &[T], budget: usize, text: F) -> Vec<Vec<T>>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut current_len = 0usize;

    for item in items {
        let len = text(item).chars().count();
        if current_len + len > budget && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(item.clone());
        current_len += len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Produce overlapping window ranges over `len` items, stepping by
/// `window - overlap` each iteration.
///
/// Requires `window > overlap` so every step makes forward progress. Later
/// windows can re-touch indices already covered by an earlier window; callers
/// must apply results idempotently.
pub fn window_ranges(len: usize, window: usize, overlap: usize) -> Vec<Range<usize>> {
    assert!(window > overlap, "window must be larger than overlap");

    let step = window - overlap;
    let mut ranges = Vec::new();
    let mut start = 0usize;
    while start < len {
        ranges.push(start..(start + window).min(len));
        start += step;
    }
    ranges
}
