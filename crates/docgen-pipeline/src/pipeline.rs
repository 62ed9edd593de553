//! SectionPipeline: one document, many sequential generation calls.

use crate::assemble::{assemble, fallback_section, fallback_summary, generated_section, summarize};
use crate::registry::DocumentRegistry;
use docgen_types::{
    DocumentResult, DocumentTypeSpec, GenerationContext, GenerationError, Generator,
    SectionRequest, SectionSummary, ValidationError,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Pause between two consecutive generation calls.
    pub pacing: Duration,
    /// Length cap of the per-section summaries fed into later calls.
    pub summary_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(1000),
            summary_chars: 240,
        }
    }
}

/// Drives the generation calls of a document strictly in order. A failed call becomes a
/// fallback section; it never aborts the document.
#[derive(Clone)]
pub struct SectionPipeline {
    registry: Arc<DocumentRegistry>,
    generator: Arc<dyn Generator>,
    config: PipelineConfig,
}

impl SectionPipeline {
    pub fn new(
        registry: Arc<DocumentRegistry>,
        generator: Arc<dyn Generator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            registry,
            generator,
            config,
        }
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Checks the document type and the mandatory subject. No generation call happens
    /// before this passes.
    pub fn validate(
        &self,
        document_type: &str,
        context: &GenerationContext,
    ) -> Result<&DocumentTypeSpec, ValidationError> {
        let layout = self.registry.resolve(document_type)?;
        context.require_subject()?;
        Ok(layout)
    }

    pub async fn run(
        &self,
        document_type: &str,
        context: &GenerationContext,
    ) -> Result<DocumentResult, ValidationError> {
        let layout = self.validate(document_type, context)?;
        Ok(self.generate(layout, context).await)
    }

    async fn generate(&self, layout: &DocumentTypeSpec, context: &GenerationContext) -> DocumentResult {
        let started = Instant::now();
        let total = layout.sections.len();
        let mut sections = Vec::with_capacity(total);
        let mut summaries: Vec<SectionSummary> = Vec::with_capacity(total);

        tracing::info!(document_type = %layout.document_type, total, "document generation started");

        for (index, spec) in layout.sections.iter().enumerate() {
            let request = SectionRequest {
                document_type: layout.document_type.clone(),
                index,
                total,
                section: spec.clone(),
                context: context.clone(),
                prior_summaries: summaries.clone(),
                profile: layout.profile.for_section(spec),
            };

            let outcome = match self.generator.generate(&request).await {
                Ok(text) if text.trim().is_empty() => Err(GenerationError::EmptyResponse),
                other => other,
            };

            let (section, summary) = match outcome {
                Ok(text) => {
                    let summary = summarize(&text, self.config.summary_chars);
                    (generated_section(index, spec, text.trim().to_string()), summary)
                }
                Err(err) => {
                    tracing::warn!(
                        document_type = %layout.document_type,
                        section = %spec.id,
                        index,
                        error = %err,
                        "section generation failed, using fallback"
                    );
                    (fallback_section(index, spec, &err), fallback_summary(&err))
                }
            };
            summaries.push(SectionSummary {
                index,
                title: spec.title.clone(),
                summary,
            });
            sections.push(section);

            if index + 1 < total && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        let doc = assemble(layout, sections, started.elapsed());
        tracing::info!(
            document_type = %layout.document_type,
            successful = doc.metadata.successful_generations,
            failed = doc.metadata.failed_generations,
            duration_ms = doc.metadata.duration_ms,
            "document generation finished"
        );
        doc
    }
}
