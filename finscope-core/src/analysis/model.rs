//! Structured analysis result and its rendering.

use crate::error::LlmError;
use crate::validation::DataQuality;
use serde::{Deserialize, Serialize};

/// Source sentinel for facts the analyst could not attribute.
pub const NO_SOURCE: &str = "Không có nguồn cụ thể";

/// Placeholder when no contradiction was found.
pub const NO_CONTRADICTIONS: &str = "Không phát hiện";

/// Largest number of key facts an analysis may list.
pub const MAX_KEY_FACTS: usize = 5;

/// How strongly the analyst stands behind a key fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

/// One cited fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFact {
    pub fact: String,
    /// URL, or [`NO_SOURCE`].
    pub source: String,
    #[serde(default)]
    pub confidence: Confidence,
}

fn default_contradictions() -> String {
    NO_CONTRADICTIONS.to_string()
}

/// A validated, machine-readable analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub warnings: Vec<String>,
    pub summary: String,
    pub key_facts: Vec<KeyFact>,
    #[serde(default = "default_contradictions")]
    pub contradictions: String,
    pub data_quality: DataQuality,
    pub data_quality_reason: String,
    pub source_count: usize,
    pub reasoning: String,
}

impl AnalysisResult {
    /// Parse a model reply, tolerating a surrounding ```json fence.
    pub fn from_reply(reply: &str) -> Result<Self, LlmError> {
        let result: AnalysisResult =
            serde_json::from_str(strip_code_fence(reply)).map_err(|e| {
                LlmError::SchemaViolation {
                    message: format!("reply is not a valid analysis object: {e}"),
                }
            })?;
        result.validate()?;
        Ok(result)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.key_facts.is_empty() || self.key_facts.len() > MAX_KEY_FACTS {
            return Err(LlmError::SchemaViolation {
                message: format!(
                    "key_facts must hold 1 to {MAX_KEY_FACTS} entries, got {}",
                    self.key_facts.len()
                ),
            });
        }
        if let Some(pos) = self
            .key_facts
            .iter()
            .position(|f| f.source.trim().is_empty())
        {
            return Err(LlmError::SchemaViolation {
                message: format!("key_facts[{pos}] has no source (use \"{NO_SOURCE}\")"),
            });
        }
        Ok(())
    }

    /// Render the report in the fixed Vietnamese layout.
    pub fn to_markdown(&self) -> String {
        let mut out = vec!["📊 PHÂN TÍCH TÀI CHÍNH\n".to_string()];

        if !self.warnings.is_empty() {
            out.push("⚠️ Cảnh báo:".to_string());
            out.extend(self.warnings.iter().map(|w| format!("- {w}")));
            out.push(String::new());
        }

        out.push("Tóm tắt:".to_string());
        out.push(format!("{}\n", self.summary));

        out.push("Điểm chính:".to_string());
        out.extend(
            self.key_facts
                .iter()
                .map(|f| format!("• {} - [Source: {}]", f.fact, f.source)),
        );
        out.push(String::new());

        out.push("Mâu thuẫn phát hiện:".to_string());
        out.push(format!("{}\n", self.contradictions));

        out.push(format!("Chất lượng dữ liệu: {}", self.data_quality));
        out.push(format!("Lý do: {}\n", self.data_quality_reason));

        out.push(format!("Nguồn: {} URLs\n", self.source_count));

        out.push("---".to_string());
        out.push("REASONING (Chain-of-Thought):".to_string());
        out.push(self.reasoning.clone());

        out.join("\n")
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_json() -> &'static str {
        r#"{
            "warnings": ["⚠️ Phát hiện số liệu thiếu đơn vị - Độ chính xác có thể thấp"],
            "summary": "Giá vàng tăng nhẹ.",
            "key_facts": [
                {"fact": "Giá vàng SJC 85 triệu/lượng", "source": "https://cafef.vn/a", "confidence": "high"},
                {"fact": "Nhu cầu tăng", "source": "Không có nguồn cụ thể"}
            ],
            "data_quality": "MEDIUM",
            "data_quality_reason": "Có 2 nguồn, dữ liệu tương đối đầy đủ",
            "source_count": 2,
            "reasoning": "Hai nguồn thống nhất."
        }"#
    }

    #[test]
    fn test_from_reply_defaults() {
        let result = AnalysisResult::from_reply(sample_json()).unwrap();
        assert_eq!(result.contradictions, NO_CONTRADICTIONS);
        assert_eq!(result.key_facts[0].confidence, Confidence::High);
        assert_eq!(result.key_facts[1].confidence, Confidence::Medium);
        assert_eq!(result.data_quality, DataQuality::Medium);
    }

    #[test]
    fn test_from_reply_strips_fence() {
        let fenced = format!("```json\n{}\n```", sample_json());
        assert!(AnalysisResult::from_reply(&fenced).is_ok());
        let bare_fence = format!("```\n{}\n```", sample_json());
        assert!(AnalysisResult::from_reply(&bare_fence).is_ok());
    }

    #[test]
    fn test_rejects_bad_quality_and_confidence() {
        let bad_quality = sample_json().replace("\"MEDIUM\"", "\"GOOD\"");
        assert!(matches!(
            AnalysisResult::from_reply(&bad_quality),
            Err(LlmError::SchemaViolation { .. })
        ));
        let bad_confidence = sample_json().replace("\"high\"", "\"certain\"");
        assert!(AnalysisResult::from_reply(&bad_confidence).is_err());
    }

    #[test]
    fn test_rejects_key_fact_counts() {
        let mut result = AnalysisResult::from_reply(sample_json()).unwrap();
        result.key_facts.clear();
        assert!(result.validate().is_err());

        let fact = KeyFact {
            fact: "x".into(),
            source: NO_SOURCE.into(),
            confidence: Confidence::Low,
        };
        result.key_facts = vec![fact; 6];
        assert!(result.validate().is_err());
        result.key_facts.truncate(5);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_source() {
        let mut result = AnalysisResult::from_reply(sample_json()).unwrap();
        result.key_facts[1].source = "  ".into();
        match result.validate() {
            Err(LlmError::SchemaViolation { message }) => assert!(message.contains("key_facts[1]")),
            other => panic!("Expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_prose() {
        assert!(AnalysisResult::from_reply("📊 PHÂN TÍCH TÀI CHÍNH ...").is_err());
    }

    #[test]
    fn test_to_markdown_layout() {
        let result = AnalysisResult::from_reply(sample_json()).unwrap();
        let md = result.to_markdown();
        let expected = "📊 PHÂN TÍCH TÀI CHÍNH\n\n\
⚠️ Cảnh báo:\n\
- ⚠️ Phát hiện số liệu thiếu đơn vị - Độ chính xác có thể thấp\n\
\n\
Tóm tắt:\n\
Giá vàng tăng nhẹ.\n\
\n\
Điểm chính:\n\
• Giá vàng SJC 85 triệu/lượng - [Source: https://cafef.vn/a]\n\
• Nhu cầu tăng - [Source: Không có nguồn cụ thể]\n\
\n\
Mâu thuẫn phát hiện:\n\
Không phát hiện\n\
\n\
Chất lượng dữ liệu: MEDIUM\n\
Lý do: Có 2 nguồn, dữ liệu tương đối đầy đủ\n\
\n\
Nguồn: 2 URLs\n\
\n\
---\n\
REASONING (Chain-of-Thought):\n\
Hai nguồn thống nhất.";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_to_markdown_without_warnings() {
        let mut result = AnalysisResult::from_reply(sample_json()).unwrap();
        result.warnings.clear();
        assert!(!result.to_markdown().contains("Cảnh báo"));
    }
}
