//! Document generation as a scheduler job.

use crate::pipeline::SectionPipeline;
use docgen_scheduler::{BoxError, JobFamily, Scheduler, SchedulerError, TypedJobId};
use docgen_types::{DocumentResult, GenerationContext, ValidationError};
use serde::{Deserialize, Serialize};

/// Payload of a document job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub document_type: String,
    #[serde(default)]
    pub context: GenerationContext,
}

pub struct DocumentJob;

impl JobFamily for DocumentJob {
    const TYPE: &'static str = "document";
    type Payload = DocumentRequest;
    type Output = DocumentResult;

    /// Jobs are tagged with their document type so listings can filter per category.
    fn job_type(payload: &DocumentRequest) -> String {
        payload.document_type.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl SectionPipeline {
    /// Validates synchronously, then runs the whole document as one background job.
    pub async fn submit(
        &self,
        scheduler: &Scheduler,
        request: DocumentRequest,
    ) -> Result<TypedJobId<DocumentJob>, SubmitError> {
        self.validate(&request.document_type, &request.context)?;
        let pipeline = self.clone();
        let id = scheduler
            .submit_typed::<DocumentJob, _, _>(request, move |req| async move {
                let doc = pipeline.run(&req.document_type, &req.context).await?;
                Ok::<_, BoxError>(doc)
            })
            .await?;
        Ok(id)
    }
}
