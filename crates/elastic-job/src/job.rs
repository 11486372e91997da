//! Job handle capability check
//!
//! The reconcile loop hands around job objects of any kind. Operations in this
//! crate only act on `ElasticJob`, and ask the handle for that capability
//! instead of downcasting.

use kube::api::DynamicObject;

use elastic_common::crd::ElasticJob;

use crate::error::JobError;

/// A job object as seen by the reconcile loop
pub trait JobObject: Send + Sync {
    /// Kind name, used in error messages
    fn kind_name(&self) -> String;

    /// The typed ElasticJob behind this handle, if it is one
    fn as_elastic_job(&self) -> Option<&ElasticJob>;
}

impl JobObject for ElasticJob {
    fn kind_name(&self) -> String {
        "ElasticJob".to_string()
    }

    fn as_elastic_job(&self) -> Option<&ElasticJob> {
        Some(self)
    }
}

/// Untyped objects never qualify, even when their kind reads "ElasticJob";
/// callers decode them into `ElasticJob` first.
impl JobObject for DynamicObject {
    fn kind_name(&self) -> String {
        self.types
            .as_ref()
            .map(|t| t.kind.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn as_elastic_job(&self) -> Option<&ElasticJob> {
        None
    }
}

/// Resolve a job handle to an ElasticJob or fail with `InvalidJobType`
pub fn elastic_job(job: &dyn JobObject) -> Result<&ElasticJob, JobError> {
    job.as_elastic_job().ok_or_else(|| JobError::InvalidJobType {
        kind: job.kind_name(),
    })
}
