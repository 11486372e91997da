//! ElasticJob CRD types
//!
//! Defines `ElasticJob`: a distributed training job whose replica count may
//! vary between `minReplicas` and `maxReplicas`. Replicas discover each other
//! through an etcd rendezvous endpoint.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Replica type key for training workers
pub const REPLICA_TYPE_WORKER: &str = "Worker";

// =============================================================================
// Replica Spec
// =============================================================================

/// Pod template and replica count for one replica type
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSpec {
    /// Desired number of replicas; defaults to 1 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pod restart policy (Always, OnFailure, Never, ExitCode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,

    /// Pod template every replica of this type is rendered from
    #[serde(default)]
    #[schemars(schema_with = "preserve_unknown_object")]
    pub template: PodTemplateSpec,
}

/// The embedded pod template is validated by the API server when pods are
/// created, so the CRD schema only asserts it is an object.
fn preserve_unknown_object(_gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
    let mut schema = schemars::schema::SchemaObject {
        instance_type: Some(schemars::schema::InstanceType::Object.into()),
        ..Default::default()
    };
    schema.extensions.insert(
        "x-kubernetes-preserve-unknown-fields".to_string(),
        serde_json::Value::Bool(true),
    );
    schemars::schema::Schema::Object(schema)
}

// =============================================================================
// CRD
// =============================================================================

/// Elastic distributed training job
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "elastic.pytorch.org",
    version = "v1alpha1",
    kind = "ElasticJob",
    plural = "elasticjobs",
    shortname = "ej",
    namespaced,
    status = "ElasticJobStatus",
    printcolumn = r#"{"name":"Endpoint","type":"string","jsonPath":".spec.rdzvEndpoint"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ElasticJobSpec {
    /// Rendezvous endpoint (`host:port` of the etcd server)
    pub rdzv_endpoint: String,

    /// Lower bound on the replica count; defaults to the desired count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<i32>,

    /// Upper bound on the replica count; defaults to the desired count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<i32>,

    /// Replica specs keyed by replica type (e.g. "Worker")
    #[serde(default)]
    pub replica_specs: BTreeMap<String, ReplicaSpec>,
}

impl ElasticJobSpec {
    /// The Worker replica spec, if one is declared
    pub fn worker(&self) -> Option<&ReplicaSpec> {
        self.replica_specs.get(REPLICA_TYPE_WORKER)
    }
}

// =============================================================================
// Status
// =============================================================================

/// A condition on an ElasticJob (Created, Running, Restarting, Succeeded, Failed)
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobCondition {
    /// Condition type
    #[serde(rename = "type")]
    pub type_: String,
    /// "True", "False" or "Unknown"
    pub status: String,
    /// Machine-readable reason for the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// RFC 3339 timestamp of the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Pod counts observed for one replica type
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaStatus {
    /// Number of running pods
    #[serde(default)]
    pub active: i32,
    /// Number of pods that completed successfully
    #[serde(default)]
    pub succeeded: i32,
    /// Number of failed pods
    #[serde(default)]
    pub failed: i32,
}

/// Status of an ElasticJob
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElasticJobStatus {
    /// Observed conditions, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<JobCondition>,
    /// Pod counts keyed by replica type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub replica_statuses: BTreeMap<String, ReplicaStatus>,
}

// =============================================================================
// Tests
// =============================================================================
