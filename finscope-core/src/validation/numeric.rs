//! Vague numeric-claim detection.
//!
//! Flags movement verbs followed by a bare number, e.g. "tăng 5" with no
//! unit, which leaves the size of the move unknowable.

use regex::Regex;
use std::sync::LazyLock;

const VERBS: [&str; 3] = ["tăng", "giảm", "đạt"];

const UNITS: [&str; 7] = ["triệu", "nghìn", "tỷ", "%", "điểm", "đồng", "usd"];

static VERB_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    VERBS
        .iter()
        .map(|verb| Regex::new(&format!(r"(?i){verb}\s+\d+(?:[.,]\d+)*")).unwrap())
        .collect()
});

/// Whether the text right after a number starts with a known unit.
fn starts_with_unit(rest: &str) -> bool {
    let rest = rest.trim_start().to_lowercase();
    UNITS.iter().any(|unit| rest.starts_with(unit))
}

/// Find the first verb + number occurrence that carries no unit.
pub fn find_vague_claim(text: &str) -> Option<&str> {
    VERB_PATTERNS.iter().find_map(|pattern| {
        pattern
            .find_iter(text)
            .find(|m| !starts_with_unit(&text[m.end()..]))
            .map(|m| m.as_str())
    })
}

/// Warn when a movement verb is followed by a number without a unit.
///
/// Returns at most one warning.
pub fn validate_numeric_claims(text: &str) -> Vec<String> {
    match find_vague_claim(text) {
        Some(_) => vec!["⚠️ Phát hiện số liệu thiếu đơn vị - Độ chính xác có thể thấp".to_string()],
        None => Vec::new(),
    }
}
