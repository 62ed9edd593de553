//! Inputs of a generation call: subject parameters and the running summary context.

use crate::{GenerationProfile, SectionSpec, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subject parameters shared by every section of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Mandatory: what the document is about.
    #[serde(default)]
    pub subject: Option<String>,
    /// Optional extra parameters; missing keys are fine.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl GenerationContext {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// The trimmed subject, or `MissingSubject` when absent or blank.
    pub fn require_subject(&self) -> Result<&str, ValidationError> {
        self.subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingSubject)
    }
}

/// Short digest of an already processed section, carried into later calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub index: usize,
    pub title: String,
    pub summary: String,
}

/// Everything one generation call receives.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRequest {
    pub document_type: String,
    pub index: usize,
    pub total: usize,
    pub section: SectionSpec,
    pub context: GenerationContext,
    pub prior_summaries: Vec<SectionSummary>,
    pub profile: GenerationProfile,
}

impl SectionRequest {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}
