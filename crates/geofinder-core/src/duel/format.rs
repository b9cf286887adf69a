//! Display helpers for duel results.

use crate::country::normalize;

/// Title-cases each word of a country name; `Unknown` when absent.
pub fn format_country(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return "Unknown".to_string();
    };
    if normalize(value).is_empty() {
        return value.to_string();
    }
    value
        .split(' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `0.42` → `42%`; `--` when the AI gave no confidence.
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c.is_finite() => format!("{}%", (c * 100.0).round() as i64),
        _ => "--".to_string(),
    }
}
