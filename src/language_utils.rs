use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Projects store a source and a target language code. Codes are accepted as
/// ISO 639-1 (2-letter) or ISO 639-3 (3-letter) and normalized to the
/// 2-letter form where one exists, since that is what the engine prompts use.

/// Look up a language from a 2- or 3-letter code
fn lookup(code: &str) -> Option<Language> {
    let code = code.trim().to_lowercase();
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => Language::from_639_3(&code),
        _ => None,
    }
}

/// Normalize a language code to its ISO 639-1 (2-letter) form.
///
/// Falls back to the ISO 639-3 code for languages without a 2-letter
/// assignment. Unknown codes are rejected.
pub fn normalize_lang_code(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Get the English name for a language code, for prompts and display
pub fn language_name(code: &str) -> Option<&'static str> {
    lookup(code).map(|lang| lang.to_name())
}

/// Check whether two language codes refer to the same language
pub fn language_codes_match(a: &str, b: &str) -> bool {
    match (lookup(a), lookup(b)) {
        (Some(lang_a), Some(lang_b)) => lang_a == lang_b,
        _ => false,
    }
}
