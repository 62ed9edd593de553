//! Mock generator for tests: deterministic text, scripted failures, no network.

use async_trait::async_trait;
use docgen_types::{GenerationError, Generator, SectionRequest};
use std::collections::HashSet;
use std::sync::Mutex;

/// Records every request it receives; fails the section indices it was told to fail.
#[derive(Default)]
pub struct MockGenerator {
    fail_at: HashSet<usize>,
    fail_all: bool,
    requests: Mutex<Vec<SectionRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the call for section `index` (0-based) fail.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at.insert(index);
        self
    }

    pub fn failing_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<SectionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, request: &SectionRequest) -> Result<String, GenerationError> {
        if let Ok(mut r) = self.requests.lock() {
            r.push(request.clone());
        }
        if self.fail_all || self.fail_at.contains(&request.index) {
            return Err(GenerationError::Other(format!(
                "injected failure at section {}",
                request.index
            )));
        }
        Ok(format!(
            "{} for {}. This is generated text for section {} of {}.",
            request.section.title,
            request.context.subject.as_deref().unwrap_or("unknown"),
            request.index + 1,
            request.total
        ))
    }
}
