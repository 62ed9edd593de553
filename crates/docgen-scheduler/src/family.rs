//! Typed job families on top of the type-erased scheduler.

use crate::error::{BoxError, SchedulerError};
use crate::scheduler::Scheduler;
use docgen_types::{Job, JobId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

/// A family of jobs sharing one payload and output shape.
pub trait JobFamily: Send + Sync + 'static {
    const TYPE: &'static str;
    type Payload: Serialize + DeserializeOwned + Send + 'static;
    type Output: Serialize + DeserializeOwned + Send + 'static;

    /// Tag recorded on the job. Defaults to [`JobFamily::TYPE`].
    fn job_type(_payload: &Self::Payload) -> String {
        Self::TYPE.to_string()
    }
}

/// Job id that remembers its family.
pub struct TypedJobId<F> {
    id: JobId,
    _family: PhantomData<fn() -> F>,
}

impl<F> TypedJobId<F> {
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            _family: PhantomData,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn into_inner(self) -> JobId {
        self.id
    }
}

impl<F> Clone for TypedJobId<F> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<F> fmt::Debug for TypedJobId<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedJobId").field(&self.id).finish()
    }
}

impl<F> fmt::Display for TypedJobId<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

/// Job snapshot with payload and result decoded into the family's types.
pub struct TypedJob<F: JobFamily> {
    pub job: Job,
    pub payload: F::Payload,
    pub result: Option<F::Output>,
}

impl Scheduler {
    pub async fn submit_typed<F, G, Fut>(
        &self,
        payload: F::Payload,
        generation_fn: G,
    ) -> Result<TypedJobId<F>, SchedulerError>
    where
        F: JobFamily,
        G: FnOnce(F::Payload) -> Fut + Send + 'static,
        Fut: Future<Output = Result<F::Output, BoxError>> + Send + 'static,
    {
        let value =
            serde_json::to_value(&payload).map_err(|e| SchedulerError::Encode(e.to_string()))?;
        let job_type = F::job_type(&payload);
        let id = self
            .submit(job_type, value, move |_| async move {
                let output = generation_fn(payload).await?;
                Ok::<_, BoxError>(serde_json::to_value(output)?)
            })
            .await;
        Ok(TypedJobId::new(id))
    }

    pub async fn get_typed<F: JobFamily>(
        &self,
        id: &TypedJobId<F>,
    ) -> Result<Option<TypedJob<F>>, SchedulerError> {
        let Some(job) = self.get(id.id()).await else {
            return Ok(None);
        };
        let payload = serde_json::from_value(job.payload().clone()).map_err(|e| {
            SchedulerError::Decode {
                job_id: job.id().clone(),
                what: "payload",
                message: e.to_string(),
            }
        })?;
        let result = job
            .result()
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(|e| SchedulerError::Decode {
                job_id: job.id().clone(),
                what: "result",
                message: e.to_string(),
            })?;
        Ok(Some(TypedJob {
            job,
            payload,
            result,
        }))
    }
}
