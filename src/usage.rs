/*!
 * Usage accounting: token/character estimation and cost conversion.
 *
 * Estimates are derived from segment text lengths, not from provider-reported
 * counts, so they stay available for cached responses and partial runs. The
 * cost table is per-model; asking for an unknown model is a configuration
 * error, not something to guess around.
 */

use chrono::{DateTime, Utc};

use crate::database::models::Segment;
use crate::errors::UsageError;

/// Conservative characters-per-token ratio used for estimation
pub const CHARS_PER_TOKEN: usize = 4;

/// USD rates per 1000 tokens for a model
#[derive(Debug, Clone, Copy)]
struct ModelRates {
    input: f64,
    output: f64,
}

/// Known model cost table, USD per 1k tokens
const MODEL_RATES: &[(&str, ModelRates)] = &[(
    "gpt-4.1-mini",
    ModelRates {
        input: 0.000_15,
        output: 0.000_6,
    },
)];

/// Estimated cost breakdown for one translate run
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    /// Cost attributed to prompt tokens
    pub input_usd: f64,
    /// Cost attributed to completion tokens
    pub output_usd: f64,
    /// Sum of input and output cost
    pub total_usd: f64,
}

/// Estimate the token count of a piece of text
pub fn estimate_tokens_from_text(text: &str) -> u64 {
    if text.is_empty() {
        return 0;
    }
    text.chars().count().div_ceil(CHARS_PER_TOKEN) as u64
}

/// Estimate tokens across segments, selecting a text field per segment.
///
/// The selector returns `None` for segments without the field set (e.g. a
/// draft that was never written); those contribute nothing.
pub fn estimate_tokens_from_segments<F>(segments: &[Segment], field: F) -> u64
where
    F: Fn(&Segment) -> Option<&str>,
{
    let chars: usize = segments
        .iter()
        .filter_map(|s| field(s))
        .map(|t| t.chars().count())
        .sum();
    (chars.div_ceil(CHARS_PER_TOKEN)) as u64
}

/// Estimate raw character counts across segments, for character-priced providers
pub fn estimate_chars_from_segments<F>(segments: &[Segment], field: F) -> u64
where
    F: Fn(&Segment) -> Option<&str>,
{
    segments
        .iter()
        .filter_map(|s| field(s))
        .map(|t| t.chars().count() as u64)
        .sum()
}

/// Convert token estimates into a cost estimate for a known model.
///
/// Unknown models fail immediately: silently pricing them at zero would make
/// the monthly ledger lie.
pub fn estimate_cost(
    model: &str,
    input_tokens: u64,
    output_tokens: u64,
) -> Result<CostEstimate, UsageError> {
    let rates = MODEL_RATES
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, rates)| *rates)
        .ok_or_else(|| UsageError::UnknownModel(model.to_string()))?;

    let input_usd = (input_tokens as f64 / 1000.0) * rates.input;
    let output_usd = (output_tokens as f64 / 1000.0) * rates.output;

    Ok(CostEstimate {
        input_usd,
        output_usd,
        total_usd: input_usd + output_usd,
    })
}

/// Ledger key for a point in time, "YYYY-MM" in UTC
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Ledger key for the current calendar month
pub fn current_month() -> String {
    month_key(Utc::now())
}
