//! Analysis orchestrator.
//!
//! Validates a research result, then asks a low-temperature model for a
//! skeptical, citation-backed critique of it. The heuristic findings are
//! passed along in the prompt so the model starts from them.

pub mod model;

pub use model::{AnalysisResult, Confidence, KeyFact};

use crate::brain::LlmProvider;
use crate::config::AnalysisConfig;
use crate::error::FinscopeError;
use crate::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, analyze_system_prompt};
use crate::types::{CompletionRequest, Message, ResearchResult};
use crate::validation::{ValidationReport, run_all_validations};
use chrono::Datelike;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the user turn presenting a research result and its validation.
pub fn build_user_message(
    result: &ResearchResult,
    report: &ValidationReport,
    max_sources: usize,
) -> String {
    let listed = result
        .sources
        .iter()
        .take(max_sources)
        .map(|url| format!("- {url}"))
        .collect::<Vec<_>>()
        .join("\n");
    let more = if result.sources.len() > max_sources {
        "..."
    } else {
        ""
    };

    let validation_context = if report.has_warnings() {
        let lines = report
            .warnings
            .iter()
            .map(|w| format!("- {w}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n⚠️ PRE-VALIDATION WARNINGS:\n{lines}\n\n")
    } else {
        String::new()
    };

    format!(
        "Research Results:\n\n\
         Answer: {answer}\n\n\
         Sources ({count} URLs):\n\
         {listed}\n\
         {more}\n\n\
         {validation_context}Pre-calculated Data Quality: {quality}\n\
         Reason: {reason}\n\n\
         Please analyze this research data following the CRITICAL RULES. Include citations for each key fact.",
        answer = result.answer,
        count = result.sources.len(),
        quality = report.quality,
        reason = report.quality_reason,
    )
}

/// The single-call analysis agent.
pub struct AnalysisAgent {
    provider: Arc<dyn LlmProvider>,
    config: AnalysisConfig,
}

impl AnalysisAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, config: AnalysisConfig) -> Self {
        Self { provider, config }
    }

    /// Validation report for `result` against the configured reference date.
    pub fn validate(&self, result: &ResearchResult) -> ValidationReport {
        run_all_validations(result, self.config.today().year())
    }

    fn request(&self, result: &ResearchResult, structured: bool) -> CompletionRequest {
        let report = self.validate(result);
        let mut system = analyze_system_prompt(self.config.today());
        if structured {
            system.push_str("\n\n");
            system.push_str(STRUCTURED_OUTPUT_INSTRUCTION);
        }
        debug!(
            warnings = report.warnings.len(),
            quality = %report.quality,
            structured,
            "Built analysis prompt"
        );
        CompletionRequest {
            messages: vec![
                Message::system(system),
                Message::user(build_user_message(
                    result,
                    &report,
                    self.config.max_sources_in_prompt,
                )),
            ],
            temperature: self.config.temperature,
            json_mode: structured,
            ..Default::default()
        }
    }

    /// Analyze a research result and return the model's report verbatim.
    pub async fn analyze(&self, result: &ResearchResult) -> Result<String, FinscopeError> {
        info!(sources = result.sources.len(), "Starting analysis");
        let response = self.provider.complete(self.request(result, false)).await?;
        Ok(response.message.content.joined_text())
    }

    /// Analyze a research result into a schema-checked [`AnalysisResult`].
    pub async fn analyze_structured(
        &self,
        result: &ResearchResult,
    ) -> Result<AnalysisResult, FinscopeError> {
        info!(sources = result.sources.len(), "Starting structured analysis");
        let response = self.provider.complete(self.request(result, true)).await?;
        let analysis = AnalysisResult::from_reply(&response.message.content.joined_text())?;
        Ok(analysis)
    }
}
