//! Per-replica pod configuration for ElasticJob
//!
//! Turns an ElasticJob's pod template into the concrete template of one
//! replica and manages the pods created from it:
//! - Replica range resolution from explicit bounds and a desired-replica oracle
//! - Rendezvous launch argument injection into the main container
//! - Per-index persistent volume claim rewriting
//! - Create/delete/list of the job's pods against the API server

pub mod args;
pub mod config;
pub mod error;
pub mod job;
pub mod pod;
pub mod replicas;
pub mod template;
pub mod volume;

pub use config::ElasticConfig;
pub use error::JobError;
pub use job::{elastic_job, JobObject};
pub use pod::{KubePodStore, PodControl, PodStore};
pub use replicas::{resolve_replica_range, ReplicaOracle, ReplicaRange, WorkerReplicasOracle};
pub use template::PodTemplateConfigurer;
