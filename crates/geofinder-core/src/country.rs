//! Free-text country matching.
//!
//! Guesses are compared in normalized form: lower-case ASCII letters and
//! single spaces only. Matching is exact against the answer's code or one of
//! the aliases derived from its canonical name; there is no fuzzy or partial
//! matching, so `"niger"` never matches `"nigeria"`.

use crate::round::CountryAnswer;
use std::collections::BTreeSet;

/// Lower-cases `text`, drops everything outside `[a-z\s]`, collapses runs of
/// whitespace into one space and trims.
pub fn normalize(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Alias groups keyed by a fragment of the normalized canonical name.
const ALIAS_GROUPS: &[(&[&str], &[&str])] = &[
    (
        &["united states"],
        &["usa", "us", "united states of america", "america"],
    ),
    (
        &["united kingdom"],
        &["uk", "great britain", "britain", "england"],
    ),
    (&["russia"], &["russian federation"]),
    (&["south korea"], &["korea", "republic of korea"]),
    (
        &["north korea"],
        &["dprk", "democratic peoples republic of korea"],
    ),
    (
        &["united arab emirates"],
        &["united arab emirates", "uae"],
    ),
    (&["czechia"], &["czech republic"]),
    (&["eswatini"], &["swaziland"]),
    (&["east timor"], &["timor leste"]),
    (
        // "côte d'ivoire" normalizes to "cte divoire"
        &["ivory coast", "cote divoire", "cte divoire"],
        &["cote divoire", "cte divoire", "ivory coast"],
    ),
];

/// All accepted spellings for a country, in normalized form.
///
/// `country` is the canonical name (normalized or not); `code` is the
/// optional ISO-style code.
pub fn aliases(country: &str, code: Option<&str>) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    let c = normalize(country);
    let cc = code.map(normalize).unwrap_or_default();

    if !cc.is_empty() {
        set.insert(cc);
    }
    if c.is_empty() {
        return set;
    }

    for (needles, extra) in ALIAS_GROUPS {
        if needles.iter().any(|needle| c.contains(needle)) {
            set.extend(extra.iter().map(|a| a.to_string()));
        }
    }
    // "uae" on its own is a canonical spelling too
    if c == "uae" {
        set.insert("united arab emirates".to_string());
    }
    set.insert(c);
    set
}

/// Returns true when an already-normalized guess names the country.
pub fn matches_guess(normalized_guess: &str, country: Option<&str>, code: Option<&str>) -> bool {
    if normalized_guess.is_empty() {
        return false;
    }
    if let Some(code) = code.filter(|c| !c.is_empty()) {
        if normalized_guess == code.to_lowercase() {
            return true;
        }
    }
    let Some(country) = country.filter(|c| !c.is_empty()) else {
        return false;
    };
    aliases(country, code).contains(normalized_guess)
}

/// Normalizes a raw guess and checks it against a round's answer.
pub fn is_correct(raw_guess: &str, answer: Option<&CountryAnswer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    matches_guess(
        &normalize(raw_guess),
        Some(answer.name.as_str()),
        answer.code.as_deref(),
    )
}
