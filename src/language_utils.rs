//! Language utilities for ISO language code handling
//!
//! Target languages arrive as ISO 639-1 (`fr`), ISO 639-2/T (`fra`),
//! ISO 639-2/B (`fre`) or BCP 47-style tags with a region (`pt-BR`).
//! The pipeline needs two things from them: a human-readable name for the
//! prompt and a way to tell whether a target is the authored language.

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Split a language tag into its primary subtag and optional region/script
fn split_tag(code: &str) -> (String, Option<String>) {
    let trimmed = code.trim();
    let mut parts = trimmed.splitn(2, ['-', '_']);
    let primary = parts.next().unwrap_or_default().to_lowercase();
    let region = parts
        .next()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);
    (primary, region)
}

/// Resolve the primary subtag of a code to an isolang language
fn lookup(primary: &str) -> Option<Language> {
    match primary.len() {
        2 => Language::from_639_1(primary),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == primary)
                .map(|(_, terminologic)| *terminologic)
                .unwrap_or(primary);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Region or script subtag: 2 to 8 ASCII letters or digits
fn is_valid_subtag(subtag: &str) -> bool {
    (2..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Conventional casing of a subtag: `BR`, `Hant`, `419`
fn canonical_subtag(subtag: &str) -> String {
    let alphabetic = subtag.chars().all(|c| c.is_ascii_alphabetic());
    match subtag.len() {
        2 if alphabetic => subtag.to_ascii_uppercase(),
        4 if alphabetic => {
            let lower = subtag.to_ascii_lowercase();
            lower[..1].to_ascii_uppercase() + &lower[1..]
        }
        _ => subtag.to_ascii_lowercase(),
    }
}

/// Validate that a code names a known language with a well-formed region
pub fn validate_language_code(code: &str) -> Result<()> {
    let trimmed = code.trim();
    let (primary, region) = split_tag(trimmed);

    // The tag ends up in cache keys and file names
    if trimmed.contains(['-', '_']) && !region.as_deref().is_some_and(is_valid_subtag) {
        return Err(anyhow!("Invalid region in language code: {}", code));
    }

    lookup(&primary)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Canonical spelling of a valid tag
///
/// `FR` gives `fr`, `pt_br` gives `pt-BR`, `zh-hant` gives `zh-Hant`. The
/// primary subtag keeps its length, so `fra` stays `fra`.
pub fn canonical_language_tag(code: &str) -> Result<String> {
    validate_language_code(code)?;
    let (primary, region) = split_tag(code);
    Ok(match region {
        Some(region) => format!("{}-{}", primary, canonical_subtag(&region)),
        None => primary,
    })
}

/// Normalize a language code to ISO 639-2/T (3-letter) format, dropping any region
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (primary, _) = split_tag(code);
    lookup(&primary)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes represent the same language and region
///
/// `en`, `eng` and ` EN ` match; `pt-BR` and `pt-PT` do not, while `pt`
/// matches neither of them.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let (primary1, region1) = split_tag(code1);
    let (primary2, region2) = split_tag(code2);

    let region_matches = match (region1, region2) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(&b),
        _ => false,
    };

    match (lookup(&primary1), lookup(&primary2)) {
        (Some(a), Some(b)) => a == b && region_matches,
        // Unknown codes only match themselves
        _ => !primary1.is_empty() && primary1 == primary2 && region_matches,
    }
}

/// Get the English language name for a code, keeping any region as a suffix
///
/// `fr` gives `French`, `pt-BR` gives `Portuguese (BR)`.
pub fn get_language_name(code: &str) -> Result<String> {
    let (primary, region) = split_tag(code);
    let lang = lookup(&primary)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(match region {
        Some(region) => format!("{} ({})", lang.to_name(), region),
        None => lang.to_name().to_string(),
    })
}
