//! Per-replica pod template configuration
//!
//! Renders the pod template of one replica from the job's template:
//! 1. Resolve the replica range
//! 2. Inject the rendezvous launch block into the main container's args
//! 3. Bind persistent volume claims to the replica index
//!
//! Argument injection is not idempotent, so every configured template is
//! stamped with [`CONFIGURED_ANNOTATION`] and templates that carry it are
//! refused.

use std::sync::Arc;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::ResourceExt;
use tracing::debug;

use elastic_common::CONFIGURED_ANNOTATION;

use crate::args::{inject_launch_args_after, rendezvous_args};
use crate::config::ElasticConfig;
use crate::error::JobError;
use crate::job::{elastic_job, JobObject};
use crate::replicas::{resolve_replica_range, ReplicaOracle};
use crate::volume::reindex_claims;

/// Whether `template` was already produced by [`PodTemplateConfigurer::configure`]
pub fn is_configured(template: &PodTemplateSpec) -> bool {
    template
        .metadata
        .as_ref()
        .and_then(|m| m.annotations.as_ref())
        .is_some_and(|a| a.contains_key(CONFIGURED_ANNOTATION))
}

/// Produces configured per-replica pod templates
pub struct PodTemplateConfigurer {
    config: ElasticConfig,
    oracle: Arc<dyn ReplicaOracle>,
}

impl PodTemplateConfigurer {
    /// Create a configurer consulting `oracle` for the desired replica count
    pub fn new(config: ElasticConfig, oracle: Arc<dyn ReplicaOracle>) -> Self {
        Self { config, oracle }
    }

    /// Render the template of replica `index` from `template`.
    ///
    /// The input template is left untouched. Only the first container is the
    /// training process; sidecars keep their args.
    pub fn configure(
        &self,
        job: &dyn JobObject,
        template: &PodTemplateSpec,
        index: &str,
    ) -> Result<PodTemplateSpec, JobError> {
        let elastic = elastic_job(job)?;
        let name = elastic.name_any();

        if is_configured(template) {
            return Err(JobError::AlreadyConfigured { job: name });
        }

        let range = resolve_replica_range(job, self.oracle.as_ref())?;
        let block = rendezvous_args(
            &self.config.rdzv_backend,
            &elastic.spec.rdzv_endpoint,
            &name,
            range,
        );

        let mut configured = template.clone();
        let spec = configured
            .spec
            .as_mut()
            .ok_or_else(|| JobError::NoMainContainer { job: name.clone() })?;
        let main = spec
            .containers
            .first_mut()
            .ok_or_else(|| JobError::NoMainContainer { job: name.clone() })?;

        let args = main.args.take().unwrap_or_default();
        main.args = Some(inject_launch_args_after(
            &args,
            &block,
            &self.config.launch_sentinel,
        ));

        let rebound = spec
            .volumes
            .as_deref_mut()
            .map_or(0, |volumes| reindex_claims(volumes, self.config.claim_separator, index));

        configured
            .metadata
            .get_or_insert_with(Default::default)
            .annotations
            .get_or_insert_with(Default::default)
            .insert(CONFIGURED_ANNOTATION.to_string(), "true".to_string());

        debug!(
            job = %name,
            index,
            nnodes = %range,
            rebound_claims = rebound,
            "configured replica pod template"
        );
        Ok(configured)
    }

    /// Configure `template` in place for replica `index`.
    ///
    /// On error the template is left as it was.
    pub fn set_cluster_spec_for_pod(
        &self,
        job: &dyn JobObject,
        template: &mut PodTemplateSpec,
        index: &str,
    ) -> Result<(), JobError> {
        *template = self.configure(job, template, index)?;
        Ok(())
    }
}
