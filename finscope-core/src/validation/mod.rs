//! Heuristic validation of research output.
//!
//! Every check is a pure function over the answer text (or the source
//! list) and never fails; findings are human-readable warning strings that
//! are forwarded to the analysis model.

pub mod contradiction;
pub mod dates;
pub mod numeric;
pub mod quality;

pub use contradiction::detect_contradictions;
pub use dates::validate_future_dates;
pub use numeric::validate_numeric_claims;
pub use quality::{DataQuality, QualityAssessment, validate_source_quality};

use crate::types::ResearchResult;
use serde::{Deserialize, Serialize};

/// Combined outcome of all validators for one research result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    pub quality: DataQuality,
    pub quality_reason: String,
    pub source_count: usize,
}

impl ValidationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run every validator over a research result.
///
/// Warnings come in a fixed order: future dates, numeric claims, then
/// contradictions. `current_year` is the reference for future-date checks.
pub fn run_all_validations(result: &ResearchResult, current_year: i32) -> ValidationReport {
    let mut warnings = validate_future_dates(&result.answer, current_year);
    warnings.extend(validate_numeric_claims(&result.answer));
    warnings.extend(detect_contradictions(&result.answer));

    let QualityAssessment { quality, reason } =
        validate_source_quality(&result.sources, &result.answer);

    tracing::debug!(
        warnings = warnings.len(),
        quality = %quality,
        sources = result.sources.len(),
        "Validated research result"
    );

    ValidationReport {
        warnings,
        quality,
        quality_reason: reason,
        source_count: result.sources.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_not_found_answer() {
        let result = ResearchResult::new("Không tìm thấy thông tin liên quan.", vec![]);
        let report = run_all_validations(&result, 2025);
        assert!(report.warnings.is_empty());
        assert_eq!(report.quality, DataQuality::Low);
        assert_eq!(report.source_count, 0);
    }

    #[test]
    fn test_empty_result() {
        let report = run_all_validations(&ResearchResult::default(), 2025);
        assert!(!report.has_warnings());
        assert_eq!(report.quality, DataQuality::Low);
        assert_eq!(report.quality_reason, "Chỉ có 0 nguồn, thiếu dữ liệu cụ thể");
    }

    #[test]
    fn test_warning_order() {
        let result = ResearchResult::new(
            "Chỉ số tăng 5 vào tháng 6/2026. Sau đó giảm mạnh.",
            vec!["https://a.vn".into(), "https://b.vn".into()],
        );
        let report = run_all_validations(&result, 2025);
        assert_eq!(report.warnings.len(), 4);
        assert!(report.warnings[0].starts_with("⚠️ Phát hiện ngày tương lai"));
        assert!(report.warnings[1].contains("tháng/năm tương lai"));
        assert!(report.warnings[2].contains("thiếu đơn vị"));
        assert!(report.warnings[3].contains("mâu thuẫn"));
        assert_eq!(report.quality, DataQuality::Medium);
        assert_eq!(report.source_count, 2);
    }

    #[test]
    fn test_report_serializes_quality_uppercase() {
        let report = run_all_validations(&ResearchResult::default(), 2025);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["quality"], "LOW");
        assert_eq!(json["source_count"], 0);
    }
}
