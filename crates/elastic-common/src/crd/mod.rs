//! Custom Resource Definitions for the elastic operator

mod job;

pub use job::{
    ElasticJob, ElasticJobSpec, ElasticJobStatus, JobCondition, ReplicaSpec, ReplicaStatus,
    REPLICA_TYPE_WORKER,
};
