//! Future-date detection.
//!
//! Financial news should describe the past or present; a year after the
//! reference year usually means a forecast or a hallucinated figure.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tháng\s+\d+[/\-](20\d{2})").unwrap());

/// Distinct `20xx` years in `text` that lie after `current_year`, ascending.
pub fn future_years(text: &str, current_year: i32) -> BTreeSet<i32> {
    YEAR_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<i32>().ok())
        .filter(|year| *year > current_year)
        .collect()
}

fn has_future_month_year(text: &str, current_year: i32) -> bool {
    MONTH_YEAR_RE.captures_iter(text).any(|caps| {
        caps[1]
            .parse::<i32>()
            .is_ok_and(|year| year > current_year)
    })
}

/// Warn about years (and `tháng N/YYYY` dates) later than `current_year`.
///
/// Returns at most two warnings: one listing every distinct future year,
/// and one more when a future month/year pattern appears.
pub fn validate_future_dates(text: &str, current_year: i32) -> Vec<String> {
    let mut warnings = Vec::new();

    let years = future_years(text, current_year);
    if !years.is_empty() {
        let listed = years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        warnings.push(format!(
            "⚠️ Phát hiện ngày tương lai: {listed} (hiện tại: {current_year}) - Có thể là dự đoán hoặc lỗi"
        ));
    }

    if has_future_month_year(text, current_year) {
        warnings.push(
            "⚠️ Phát hiện tháng/năm tương lai trong text - Kiểm tra tính chính xác".to_string(),
        );
    }

    warnings
}
