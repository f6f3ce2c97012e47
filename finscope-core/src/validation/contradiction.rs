//! Adjacent-sentence contradiction detection.
//!
//! Looks for antonym pairs (Vietnamese and English) split across
//! neighbouring sentences, e.g. "Giá vàng tăng. Giá vàng giảm."

/// Antonym pairs checked in order; the first pair that matches is reported.
pub const ANTONYM_PAIRS: [(&str, &str); 6] = [
    ("tăng", "giảm"),
    ("increase", "decrease"),
    ("cao", "thấp"),
    ("high", "low"),
    ("tích cực", "tiêu cực"),
    ("positive", "negative"),
];

/// Whether `first` occurs in one sentence and `second` in a neighbouring one.
fn in_adjacent_sentences(sentences: &[&str], first: &str, second: &str) -> bool {
    sentences.iter().enumerate().any(|(i, sentence)| {
        sentence.contains(first)
            && [i.checked_sub(1), Some(i + 1)]
                .into_iter()
                .flatten()
                .filter_map(|j| sentences.get(j))
                .any(|neighbour| neighbour.contains(second))
    })
}

/// The first antonym pair whose words appear in adjacent sentences.
pub fn find_contradiction(text: &str) -> Option<(&'static str, &'static str)> {
    let lower = text.to_lowercase();
    let sentences: Vec<&str> = lower.split(['.', '!', '?']).collect();

    ANTONYM_PAIRS.into_iter().find(|(first, second)| {
        lower.contains(first)
            && lower.contains(second)
            && in_adjacent_sentences(&sentences, first, second)
    })
}

/// Warn when the text states opposite movements in neighbouring sentences.
///
/// Returns at most one warning.
pub fn detect_contradictions(text: &str) -> Vec<String> {
    find_contradiction(text)
        .map(|(first, second)| {
            vec![format!(
                "⚠️ Phát hiện mâu thuẫn tiềm ẩn: văn bản chứa cả '{first}' và '{second}'"
            )]
        })
        .unwrap_or_default()
}
