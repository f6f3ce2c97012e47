//! Source preprocessing filters.
//!
//! Drops thin, speculative, and duplicated search records before their
//! content is trusted. All filters preserve the input order of survivors.

use crate::config::PreprocessConfig;
use crate::types::{ResearchResult, SourceRecord};
use crate::validation::dates::future_years;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keywords that mark forecast-style content (Vietnamese and English).
pub const PREDICTION_KEYWORDS: [&str; 10] = [
    "dự đoán",
    "dự báo",
    "sẽ là",
    "có thể sẽ",
    "prediction",
    "forecast",
    "will be",
    "could be",
    "might be",
    "expected to be",
];

/// Records matching this many distinct keywords are rejected.
const PREDICTION_KEYWORD_LIMIT: usize = 2;

/// Keep records whose content has at least `min_length` characters.
pub fn filter_short_content(records: Vec<SourceRecord>, min_length: usize) -> Vec<SourceRecord> {
    records
        .into_iter()
        .filter(|r| !r.content.is_empty() && r.content.chars().count() >= min_length)
        .collect()
}

/// Number of distinct prediction keywords present in `content`.
pub fn prediction_keyword_count(content: &str) -> usize {
    let lower = content.to_lowercase();
    PREDICTION_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count()
}

/// Drop records that read like forecasts rather than reporting.
pub fn reject_prediction_content(records: Vec<SourceRecord>) -> Vec<SourceRecord> {
    records
        .into_iter()
        .filter(|r| {
            let hits = prediction_keyword_count(&r.content);
            if hits >= PREDICTION_KEYWORD_LIMIT {
                debug!(url = %r.url, hits, "Rejecting prediction content");
                false
            } else {
                true
            }
        })
        .collect()
}

/// Whether two normalized contents are near-duplicates.
fn is_near_duplicate(a: &str, b: &str, threshold: f64) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if !longer.contains(shorter) {
        return false;
    }
    let ratio = shorter.chars().count() as f64 / longer.chars().count() as f64;
    ratio >= threshold
}

/// Remove near-duplicate records; the first occurrence wins.
///
/// Content is compared lowercased and trimmed. Records with empty content
/// are dropped.
pub fn deduplicate_sources(records: Vec<SourceRecord>, threshold: f64) -> Vec<SourceRecord> {
    let mut kept: Vec<(String, SourceRecord)> = Vec::new();

    for record in records {
        let normalized = record.content.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        if kept
            .iter()
            .any(|(seen, _)| is_near_duplicate(seen, &normalized, threshold))
        {
            debug!(url = %record.url, "Dropping duplicate source");
            continue;
        }
        kept.push((normalized, record));
    }

    kept.into_iter().map(|(_, record)| record).collect()
}

/// True when the content mentions no year after `current_year`.
pub fn validate_date_in_content(content: &str, current_year: i32) -> bool {
    future_years(content, current_year).is_empty()
}

/// A research result after the preprocessing filters ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedResult {
    pub answer: String,
    pub sources: Vec<String>,
    pub source_count: usize,
    pub preprocessing_warnings: Vec<String>,
}

/// Apply length, prediction, and duplicate filters to a research result.
///
/// When no records were captured, each URL becomes a record with empty
/// content, which the length filter then removes. The future-date warning
/// looks at the answer only.
pub fn preprocess_research_results(
    result: &ResearchResult,
    config: &PreprocessConfig,
    current_year: i32,
) -> PreprocessedResult {
    let records = result.normalized_records();
    let before = records.len();

    let records = filter_short_content(records, config.min_content_length);
    let records = reject_prediction_content(records);
    let records = deduplicate_sources(records, config.similarity_threshold);

    let mut preprocessing_warnings = Vec::new();
    if !validate_date_in_content(&result.answer, current_year) {
        preprocessing_warnings.push("⚠️ Detected potential future dates in content".to_string());
    }

    debug!(before, after = records.len(), "Preprocessed sources");

    let sources: Vec<String> = records.into_iter().map(|r| r.url).collect();
    PreprocessedResult {
        answer: result.answer.clone(),
        source_count: sources.len(),
        sources,
        preprocessing_warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(url: &str, content: &str) -> SourceRecord {
        SourceRecord::new(url, content)
    }

    fn long(text: &str) -> String {
        format!("{text} Thị trường chứng khoán Việt Nam giao dịch sôi động hôm nay.")
    }

    #[test]
    fn test_filter_short_content() {
        let records = vec![
            record("a", ""),
            record("b", "ngắn"),
            record("c", &"x".repeat(50)),
            record("d", &"y".repeat(49)),
        ];
        let kept = filter_short_content(records, 50);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "c");
    }

    #[test]
    fn test_filter_counts_characters_not_bytes() {
        // 20 Vietnamese characters take more than 20 bytes
        let content = "ệ".repeat(20);
        assert!(content.len() > 20);
        assert_eq!(filter_short_content(vec![record("a", &content)], 21).len(), 0);
        assert_eq!(filter_short_content(vec![record("a", &content)], 20).len(), 1);
    }

    #[test]
    fn test_reject_prediction_content() {
        let records = vec![
            record("a", "Chuyên gia dự báo giá vàng sẽ là 90 triệu"),
            record("b", "Analysts forecast it could be lower"),
            record("c", "Có một dự báo duy nhất"),
            record("d", "Giá vàng hôm nay 85 triệu"),
        ];
        let kept: Vec<String> = reject_prediction_content(records)
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(kept, vec!["c".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        assert_eq!(prediction_keyword_count("dự báo, dự báo, dự báo"), 1);
    }

    #[test]
    fn test_deduplicate_exact_and_case() {
        let body = long("Giá vàng tăng.");
        let records = vec![
            record("a", &body),
            record("b", &body.to_uppercase()),
            record("c", &format!("  {body}  ")),
            record("d", &long("Tỷ giá ổn định.")),
        ];
        let kept: Vec<String> = deduplicate_sources(records, 0.95)
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(kept, vec!["a".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_deduplicate_contained_below_threshold_kept() {
        let short = "Giá vàng SJC hôm nay tăng mạnh";
        let longer = format!("{short} theo đà tăng của thị trường thế giới");
        let records = vec![record("a", short), record("b", &longer)];
        assert_eq!(deduplicate_sources(records, 0.95).len(), 2);
    }

    #[test]
    fn test_deduplicate_drops_empty() {
        let records = vec![record("a", "   "), record("b", "nội dung")];
        let kept = deduplicate_sources(records, 0.95);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "b");
    }

    #[test]
    fn test_validate_date_in_content() {
        assert!(validate_date_in_content("Năm 2024 tăng trưởng", 2025));
        assert!(!validate_date_in_content("Kế hoạch 2030", 2025));
    }

    #[test]
    fn test_preprocess_url_only_result() {
        let result = ResearchResult::new("Giá vàng 85 triệu", vec!["https://a.vn".into()]);
        let processed = preprocess_research_results(&result, &PreprocessConfig::default(), 2025);
        assert_eq!(processed.source_count, 0);
        assert!(processed.sources.is_empty());
        assert!(processed.preprocessing_warnings.is_empty());
        assert_eq!(processed.answer, "Giá vàng 85 triệu");
    }

    #[test]
    fn test_preprocess_pipeline_order() {
        let good = long("Giá vàng tăng 2 triệu đồng.");
        let result = ResearchResult::new("Tổng hợp năm 2027", vec![]).with_records(vec![
            record("https://a.vn", &good),
            record("https://b.vn", "ngắn"),
            record(
                "https://c.vn",
                &long("Chuyên gia dự đoán giá sẽ là 100 triệu."),
            ),
            record("https://d.vn", &good),
        ]);
        let processed = preprocess_research_results(&result, &PreprocessConfig::default(), 2025);
        assert_eq!(processed.sources, vec!["https://a.vn".to_string()]);
        assert_eq!(processed.source_count, 1);
        assert_eq!(
            processed.preprocessing_warnings,
            vec!["⚠️ Detected potential future dates in content".to_string()]
        );
    }

    #[test]
    fn test_future_year_in_record_only_is_not_flagged() {
        let result = ResearchResult::new("Giá vàng hôm nay ổn định.", vec![]).with_records(vec![
            record(
                "https://a.vn",
                &long("Doanh nghiệp đặt mục tiêu doanh thu năm 2030 tăng gấp đôi."),
            ),
        ]);
        let processed = preprocess_research_results(&result, &PreprocessConfig::default(), 2025);
        assert_eq!(processed.sources, vec!["https://a.vn".to_string()]);
        assert!(processed.preprocessing_warnings.is_empty());
    }
}
