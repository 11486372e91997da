//! Pod lifecycle for ElasticJob replicas
//!
//! Thin create/delete/list layer the reconcile loop calls with already
//! configured pods. Nothing here retries: store errors are returned as the
//! API server reported them and the reconcile loop's backoff decides what
//! happens next.
//!
//! Pods are matched to their job by label selector only. Pods that lost the
//! job labels are not adopted back through owner references.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::runtime::events::EventType;
use kube::{Client, Resource, ResourceExt};
use tracing::{info, warn};

#[cfg(test)]
use mockall::automock;

use elastic_common::crd::ElasticJob;
use elastic_common::events::{actions, reasons, EventPublisher, KubeEventPublisher};
use elastic_common::labels::{gen_labels, to_selector};

use crate::config::ElasticConfig;
use crate::error::JobError;
use crate::job::{elastic_job, JobObject};

/// Trait abstracting the pod operations of the Kubernetes API
///
/// Allows mocking the API server in tests while using the real client in
/// production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PodStore: Send + Sync {
    /// Create a pod in `namespace`
    async fn create(&self, namespace: &str, pod: &Pod) -> Result<Pod, kube::Error>;

    /// Delete the pod `name` in `namespace`
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), kube::Error>;

    /// List pods in `namespace` matching an equality label selector
    async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, kube::Error>;
}

/// Real Kubernetes client implementation
pub struct KubePodStore {
    client: Client,
}

impl KubePodStore {
    /// Create a new KubePodStore wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodStore for KubePodStore {
    async fn create(&self, namespace: &str, pod: &Pod) -> Result<Pod, kube::Error> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), pod).await
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), kube::Error> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, kube::Error> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default().labels(label_selector)).await?;
        Ok(pods.items)
    }
}

/// Pod operations on behalf of an ElasticJob
pub struct PodControl {
    store: Arc<dyn PodStore>,
    events: Arc<dyn EventPublisher>,
    group_name: String,
}

impl PodControl {
    /// Create a PodControl over the given store and event sink
    pub fn new(
        store: Arc<dyn PodStore>,
        events: Arc<dyn EventPublisher>,
        config: &ElasticConfig,
    ) -> Self {
        Self {
            store,
            events,
            group_name: config.group_name.clone(),
        }
    }

    /// PodControl backed by the API server, reporting Events as
    /// `config.controller_name`
    pub fn for_cluster(client: Client, config: &ElasticConfig) -> Self {
        Self::new(
            Arc::new(KubePodStore::new(client.clone())),
            Arc::new(KubeEventPublisher::new(client, &config.controller_name)),
            config,
        )
    }

    /// Create `pod` for `job`.
    pub async fn create_pod(&self, job: &dyn JobObject, pod: &Pod) -> Result<(), JobError> {
        let job = elastic_job(job)?;
        let namespace = pod_namespace(job, pod)?;
        let pod_name = pod.name_any();

        info!(
            namespace = %namespace,
            pod = %pod_name,
            job = %job.name_any(),
            "creating pod"
        );

        if let Err(e) = self.store.create(&namespace, pod).await {
            info!(pod = %pod_name, error = %e, "error creating pod");
            return Err(e.into());
        }
        Ok(())
    }

    /// Delete `pod` of `job`, recording the outcome as an Event on the job.
    pub async fn delete_pod(&self, job: &dyn JobObject, pod: &Pod) -> Result<(), JobError> {
        let job = elastic_job(job)?;
        let namespace = pod_namespace(job, pod)?;
        let pod_name = pod.name_any();

        info!(
            namespace = %namespace,
            pod = %pod_name,
            job = %job.name_any(),
            "deleting pod"
        );

        let job_ref = job.object_ref(&());
        match self.store.delete(&namespace, &pod_name).await {
            Ok(()) => {
                self.events
                    .publish(
                        &job_ref,
                        EventType::Normal,
                        reasons::SUCCESSFUL_DELETE_POD,
                        actions::DELETE_POD,
                        Some(format!("Deleted pod: {pod_name}")),
                    )
                    .await;
                Ok(())
            }
            Err(e) => {
                warn!(pod = %pod_name, error = %e, "error deleting pod");
                self.events
                    .publish(
                        &job_ref,
                        EventType::Warning,
                        reasons::FAILED_DELETE_POD,
                        actions::DELETE_POD,
                        Some(format!("Error deleting: {e}")),
                    )
                    .await;
                Err(e.into())
            }
        }
    }

    /// List the pods carrying `job`'s labels, in the order the API returned them.
    ///
    /// No matching pods is an empty list, not an error.
    pub async fn get_pods_for_job(&self, job: &dyn JobObject) -> Result<Vec<Pod>, JobError> {
        let job = elastic_job(job)?;
        let name = job.metadata.name.as_deref().ok_or(JobError::MissingName)?;
        let namespace = job
            .metadata
            .namespace
            .as_deref()
            .ok_or_else(|| JobError::MissingNamespace {
                job: name.to_string(),
            })?;

        let selector = to_selector(&gen_labels(&self.group_name, name));
        let pods = self.store.list(namespace, &selector).await?;
        Ok(pods)
    }
}

/// The pod's own namespace, falling back to the job's
fn pod_namespace(job: &ElasticJob, pod: &Pod) -> Result<String, JobError> {
    pod.metadata
        .namespace
        .clone()
        .or_else(|| job.metadata.namespace.clone())
        .ok_or_else(|| JobError::MissingNamespace {
            job: job.name_any(),
        })
}
