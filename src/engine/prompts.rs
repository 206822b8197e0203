/*!
 * Prompt assembly for the three engine operations.
 *
 * All prompts demand structured JSON output and state the invariants the
 * response must satisfy. Callers never trust the model to honor them; the
 * write-back guards in the job handlers verify everything on the way in.
 */

use super::{ConsistencyItem, SourceLine};
use crate::language_utils;

/// System directive sent with every chat call
pub const SYSTEM_DIRECTIVE: &str = "You translate subtitles accurately and concisely.";

/// Hard ceiling for an assembled consistency prompt, in characters.
///
/// Exceeding it means the caller windowed too coarsely; it is a
/// configuration error and aborts the call before anything is sent.
pub const CONSISTENCY_PROMPT_CEILING: usize = 12_000;

/// Render a language code as a readable name for prompts
fn lang_display(code: &str) -> String {
    language_utils::language_name(code)
        .map(|name| format!("{} ({})", name, code))
        .unwrap_or_else(|| code.to_string())
}

/// Build the prompt for one batch translation call
pub fn build_batch_prompt(chunk: &[SourceLine], source_lang: &str, target_lang: &str) -> String {
    let numbered = chunk
        .iter()
        .map(|line| format!("({}) {}", line.idx, line.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Translate the following subtitle lines from {src} to {dst}.
Keep them concise and suitable for subtitles.
Treat each subtitle line independently; never merge or split lines.
Preserve speaker markers: a leading "-" must stay the first character.
Preserve italic markers (e.g., "<i>...</i>") in the same positions.
Do NOT add explanations.

Return JSON ONLY in this format:
{{
  "lines": [
    {{ "idx": <number>, "text": "...", "confidence": 0.0 }}
  ]
}}

Lines:
{lines}"#,
        src = lang_display(source_lang),
        dst = lang_display(target_lang),
        lines = numbered,
    )
}

/// Build the prompt for variant suggestions on a single segment
pub fn build_variants_prompt(
    source_text: &str,
    n: usize,
    style: &str,
    source_lang: &str,
    target_lang: &str,
) -> String {
    format!(
        r#"You are translating subtitles from {src} to {dst}.
Your primary goal is viewer comprehension and comfortable reading speed.

Style: {style}

Translate the subtitle line below into {dst}.
Return {n} different alternatives.
Each alternative must be short, natural, and suitable for subtitles.
Preserve speaker markers and italic markers exactly as in the source.
Paraphrase freely to preserve meaning; condense when a literal translation
would be too long to read comfortably.
Do not merge or split subtitle lines.

Subtitle:
"""{text}"""

Return JSON in the following format ONLY:
{{
  "variants": [
    {{ "text": "...", "confidence": 0.0 }}
  ]
}}"#,
        src = lang_display(source_lang),
        dst = lang_display(target_lang),
        style = style,
        n = n,
        text = source_text,
    )
}

/// Build the prompt for one consistency window
pub fn build_consistency_prompt(
    items: &[ConsistencyItem],
    source_lang: &str,
    target_lang: &str,
) -> String {
    let numbered = items
        .iter()
        .map(|item| format!("({}) SOURCE: {}\nDRAFT: {}", item.id, item.source, item.draft))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are reviewing draft subtitle translations from {src} to {dst}.

Goal:
- Improve consistency only.
- Do NOT retranslate from scratch.
- Do NOT change meaning.
- Keep tone and style consistent across all lines.

Fix:
- names translated inconsistently
- repeated phrases translated differently
- honorifics / formality drift
- pronouns or terms used inconsistently

Choose ONE address register (formal or informal) for the whole set and
enforce it consistently; when the relationship between speakers is unclear,
default to informal.

STRUCTURE RULES (MANDATORY):
- Each subtitle line is independent.
- Do NOT merge lines.
- Do NOT split lines.
- Do NOT remove lines.
- Do NOT add new lines.
- Return exactly one corrected text per given ID.
- Only include IDs whose text you actually changed.

Return JSON ONLY in this format:
{{
  "lines": [
    {{ "id": 123, "text": "corrected subtitle line" }}
  ]
}}

Lines:
{lines}"#,
        src = lang_display(source_lang),
        dst = lang_display(target_lang),
        lines = numbered,
    )
}
