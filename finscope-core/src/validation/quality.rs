//! Source quality scoring.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

static UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(triệu|nghìn|tỷ|%|điểm|đồng|USD|VND|lượng)").unwrap());

/// Answers longer than this (in characters) count as detailed.
const DETAILED_ANSWER_CHARS: usize = 100;

/// Coarse quality tier for a research result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::High => "HIGH",
            DataQuality::Medium => "MEDIUM",
            DataQuality::Low => "LOW",
        }
    }
}

impl std::fmt::Display for DataQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(DataQuality::High),
            "MEDIUM" => Ok(DataQuality::Medium),
            "LOW" => Ok(DataQuality::Low),
            other => Err(format!(
                "unknown data quality '{other}' (expected HIGH, MEDIUM, or LOW)"
            )),
        }
    }
}

/// A quality tier with its human-readable justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub quality: DataQuality,
    pub reason: String,
}

/// Score how well the sources and answer support downstream analysis.
///
/// - HIGH: at least 3 sources and a detailed answer with numbers and units.
/// - MEDIUM: at least 2 sources and an answer with numbers.
/// - LOW: anything else.
pub fn validate_source_quality(sources: &[String], answer: &str) -> QualityAssessment {
    let count = sources.len();
    let has_digits = DIGIT_RE.is_match(answer);
    let has_units = UNIT_RE.is_match(answer);
    let is_detailed = answer.chars().count() > DETAILED_ANSWER_CHARS;

    if count >= 3 && has_digits && has_units && is_detailed {
        QualityAssessment {
            quality: DataQuality::High,
            reason: format!("Có {count} nguồn, dữ liệu cụ thể với đơn vị rõ ràng"),
        }
    } else if count >= 2 && has_digits {
        QualityAssessment {
            quality: DataQuality::Medium,
            reason: format!("Có {count} nguồn, dữ liệu tương đối đầy đủ"),
        }
    } else {
        let missing = if !has_digits {
            "thiếu dữ liệu cụ thể"
        } else if !has_units {
            "thiếu đơn vị rõ ràng"
        } else {
            "không đủ nguồn để đối chiếu"
        };
        QualityAssessment {
            quality: DataQuality::Low,
            reason: format!("Chỉ có {count} nguồn, {missing}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://news{i}.vn/a")).collect()
    }

    fn detailed_answer() -> String {
        let answer = format!(
            "Giá vàng SJC hôm nay ở mức 85 triệu đồng mỗi lượng. {}",
            "Thị trường trong nước biến động theo giá thế giới trong tuần qua."
        );
        assert!(answer.chars().count() > 100);
        answer
    }

    #[test]
    fn test_high_quality() {
        let result = validate_source_quality(&urls(3), &detailed_answer());
        assert_eq!(result.quality, DataQuality::High);
        assert_eq!(result.reason, "Có 3 nguồn, dữ liệu cụ thể với đơn vị rõ ràng");
    }

    #[test]
    fn test_short_answer_is_medium() {
        let result = validate_source_quality(&urls(3), "Giá vàng 85 triệu");
        assert_eq!(result.quality, DataQuality::Medium);
        assert_eq!(result.reason, "Có 3 nguồn, dữ liệu tương đối đầy đủ");
    }

    #[test]
    fn test_no_digits_is_low() {
        let result = validate_source_quality(&urls(4), "Giá vàng tăng mạnh");
        assert_eq!(result.quality, DataQuality::Low);
        assert_eq!(result.reason, "Chỉ có 4 nguồn, thiếu dữ liệu cụ thể");
    }

    #[test]
    fn test_non_ascii_digits_count_as_data() {
        // Arabic-Indic and fullwidth digits
        let result = validate_source_quality(&urls(2), "Giá vàng ٨٥ triệu");
        assert_eq!(result.quality, DataQuality::Medium);
        let result = validate_source_quality(&urls(2), "Giá vàng ８５ triệu");
        assert_eq!(result.quality, DataQuality::Medium);
    }

    #[test]
    fn test_single_source_reasons() {
        let result = validate_source_quality(&urls(1), "Tăng 5 lần");
        assert_eq!(result.reason, "Chỉ có 1 nguồn, thiếu đơn vị rõ ràng");

        let result = validate_source_quality(&urls(1), "Tăng 5%");
        assert_eq!(result.reason, "Chỉ có 1 nguồn, không đủ nguồn để đối chiếu");
    }

    #[test]
    fn test_zero_sources_always_low() {
        let result = validate_source_quality(&[], &detailed_answer());
        assert_eq!(result.quality, DataQuality::Low);
    }

    #[test]
    fn test_data_quality_serde_and_parse() {
        assert_eq!(serde_json::to_string(&DataQuality::High).unwrap(), "\"HIGH\"");
        let parsed: DataQuality = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(parsed, DataQuality::Medium);
        assert_eq!("low".parse::<DataQuality>().unwrap(), DataQuality::Low);
        assert!("EXCELLENT".parse::<DataQuality>().is_err());
    }
}
