//! Declarative document layouts: which sections a document type has, in which order,
//! and how its generation calls are tuned.

use serde::{Deserialize, Serialize};

/// One section definition of a document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Type-specific section id (e.g. "market_analysis").
    pub id: String,
    pub title: String,
    /// What the section should contain; handed to the generator as-is.
    pub directive: String,
    /// Overrides the document profile's `max_tokens` for this section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Token/temperature profile used for every call of a document type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationProfile {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationProfile {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl GenerationProfile {
    /// Profile with the section's `max_tokens` override applied.
    pub fn for_section(&self, section: &SectionSpec) -> GenerationProfile {
        GenerationProfile {
            max_tokens: section.max_tokens.unwrap_or(self.max_tokens),
            temperature: self.temperature,
        }
    }
}

/// Two-way split of a finished document: the first `first_count` sections under one
/// heading, the remainder under another. Used by consumers that expect two blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSpec {
    pub first_count: usize,
    pub primary_heading: String,
    pub secondary_heading: String,
}

/// Full layout of one document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTypeSpec {
    pub document_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub profile: GenerationProfile,
    pub sections: Vec<SectionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitSpec>,
}

impl DocumentTypeSpec {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_override_wins_over_profile() {
        let profile = GenerationProfile {
            max_tokens: 1000,
            temperature: 0.3,
        };
        let mut section = SectionSpec {
            id: "a".into(),
            title: "A".into(),
            directive: "write".into(),
            max_tokens: None,
        };
        assert_eq!(profile.for_section(&section).max_tokens, 1000);
        section.max_tokens = Some(300);
        let p = profile.for_section(&section);
        assert_eq!(p.max_tokens, 300);
        assert_eq!(p.temperature, 0.3);
    }

    #[test]
    fn layout_defaults_from_json() {
        let spec: DocumentTypeSpec = serde_json::from_str(
            r#"{"document_type":"memo","sections":[{"id":"s1","title":"One","directive":"d"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.profile, GenerationProfile::default());
        assert!(spec.split.is_none());
        assert_eq!(spec.section_count(), 1);
    }
}
