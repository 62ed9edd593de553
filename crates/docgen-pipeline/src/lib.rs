//! Section pipeline: builds one multi-section document from many independent,
//! fallible generation calls, and runs it as a scheduler job.

mod assemble;
mod job;
mod pipeline;
mod registry;

pub use docgen_types::{DocumentResult, GenerationContext, ValidationError};
pub use job::{DocumentJob, DocumentRequest, SubmitError};
pub use pipeline::{PipelineConfig, SectionPipeline};
pub use registry::{DocumentRegistry, RegistryError};
