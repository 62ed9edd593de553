//! Assembled multi-section document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Appended to the title of a section whose generation call failed.
pub const FAILURE_MARKER: &str = "(GENERATION FAILED)";

/// Positional id shared by every document type: `section_01`, `section_02`, ...
pub fn canonical_section_id(index: usize) -> String {
    format!("section_{:02}", index + 1)
}

/// `successful / total` as a whole percentage, halves rounded up, e.g. "67%".
pub fn success_rate(successful: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{}%", (successful * 200 + total) / (2 * total))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionOutcome {
    Generated,
    Fallback,
}

/// One section of a finished document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub index: usize,
    pub id: String,
    pub canonical_id: String,
    pub title: String,
    pub content: String,
    pub outcome: SectionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Section {
    pub fn is_fallback(&self) -> bool {
        self.outcome == SectionOutcome::Fallback
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub document_type: String,
    pub total_sections: usize,
    pub successful_generations: usize,
    pub failed_generations: usize,
    pub success_rate: String,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// First K sections vs. the remainder, each block concatenated under its heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitDocument {
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub sections: Vec<Section>,
    /// Canonical section id -> content.
    pub content_by_id: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitDocument>,
    pub metadata: DocumentMetadata,
}

impl DocumentResult {
    pub fn section(&self, canonical_id: &str) -> Option<&str> {
        self.content_by_id.get(canonical_id).map(String::as_str)
    }

    pub fn fallback_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.is_fallback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_rounds_to_whole_percent() {
        assert_eq!(success_rate(2, 3), "67%");
        assert_eq!(success_rate(1, 3), "33%");
        assert_eq!(success_rate(10, 10), "100%");
        assert_eq!(success_rate(0, 0), "0%");
        assert_eq!(success_rate(1, 8), "13%");
        assert_eq!(success_rate(3, 8), "38%");
        assert_eq!(success_rate(5, 8), "63%");
        assert_eq!(success_rate(1, 2), "50%");
    }

    #[test]
    fn canonical_ids_are_positional() {
        assert_eq!(canonical_section_id(0), "section_01");
        assert_eq!(canonical_section_id(11), "section_12");
    }
}
