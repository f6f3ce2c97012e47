//! Recovering source records from search tool output.

use crate::types::SourceRecord;
use serde::Deserialize;

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Parse one tool output as a JSON list of `{url, content}` records.
///
/// Fails as a whole when the output is not a list of objects. Entries
/// without a URL are skipped; a missing `content` is treated as empty.
pub fn parse_tool_records(output: &str) -> Result<Vec<SourceRecord>, serde_json::Error> {
    let raw: Vec<RawRecord> = serde_json::from_str(output)?;
    Ok(raw
        .into_iter()
        .filter_map(|r| match r.url {
            Some(url) if !url.is_empty() => {
                Some(SourceRecord::new(url, r.content.unwrap_or_default()))
            }
            _ => None,
        })
        .collect())
}

/// URLs of the records, in order, duplicates kept.
pub fn urls(records: &[SourceRecord]) -> Vec<String> {
    records.iter().map(|r| r.url.clone()).collect()
}
