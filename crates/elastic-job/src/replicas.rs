//! Replica range resolution
//!
//! An elastic job runs between `minReplicas` and `maxReplicas` pods. Unset
//! bounds fall back to the desired replica count, so a job without bounds
//! behaves as a fixed-size job.

use std::fmt;

#[cfg(test)]
use mockall::automock;

use elastic_common::crd::{ElasticJob, REPLICA_TYPE_WORKER};

use crate::error::JobError;
use crate::job::{elastic_job, JobObject};

/// Effective replica bounds of an elastic job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplicaRange {
    /// Lower bound on the number of nodes
    pub min: i32,
    /// Upper bound on the number of nodes
    pub max: i32,
}

/// Rendered as `min:max`, the `--nnodes` format of the launcher
impl fmt::Display for ReplicaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.min, self.max)
    }
}

/// Source of the desired replica count of a job
#[cfg_attr(test, automock)]
pub trait ReplicaOracle: Send + Sync {
    /// Desired number of replicas for `job`
    fn desired_replicas(&self, job: &ElasticJob) -> Result<i32, JobError>;
}

/// Reads the desired count from the Worker replica spec
///
/// An omitted count means one replica.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkerReplicasOracle;

impl ReplicaOracle for WorkerReplicasOracle {
    fn desired_replicas(&self, job: &ElasticJob) -> Result<i32, JobError> {
        let worker = job
            .spec
            .worker()
            .ok_or_else(|| JobError::MissingReplicaSpec {
                job: job.metadata.name.clone().unwrap_or_default(),
                replica_type: REPLICA_TYPE_WORKER.to_string(),
            })?;
        Ok(worker.replicas.unwrap_or(1))
    }
}

/// Resolve the effective (min, max) replica bounds of `job`.
///
/// Oracle failures are returned as-is. `min <= max` is not checked.
pub fn resolve_replica_range(
    job: &dyn JobObject,
    oracle: &dyn ReplicaOracle,
) -> Result<ReplicaRange, JobError> {
    let job = elastic_job(job)?;
    let desired = oracle.desired_replicas(job)?;

    Ok(ReplicaRange {
        min: job.spec.min_replicas.unwrap_or(desired),
        max: job.spec.max_replicas.unwrap_or(desired),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use elastic_common::crd::{ElasticJobSpec, ReplicaSpec};
    use kube::api::{DynamicObject, GroupVersionKind};
    use kube::discovery::ApiResource;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn job_with_bounds(min: Option<i32>, max: Option<i32>) -> ElasticJob {
        ElasticJob::new(
            "imagenet",
            ElasticJobSpec {
                rdzv_endpoint: "etcd-service:2379".to_string(),
                min_replicas: min,
                max_replicas: max,
                replica_specs: BTreeMap::new(),
            },
        )
    }

    fn oracle_returning(desired: i32) -> MockReplicaOracle {
        let mut oracle = MockReplicaOracle::new();
        oracle
            .expect_desired_replicas()
            .returning(move |_| Ok(desired));
        oracle
    }

    #[rstest]
    #[case::no_bounds(None, None, ReplicaRange { min: 4, max: 4 })]
    #[case::explicit_min(Some(2), None, ReplicaRange { min: 2, max: 4 })]
    #[case::explicit_max(None, Some(8), ReplicaRange { min: 4, max: 8 })]
    #[case::both(Some(1), Some(3), ReplicaRange { min: 1, max: 3 })]
    #[case::inverted_bounds_pass_through(Some(5), Some(2), ReplicaRange { min: 5, max: 2 })]
    fn bounds_fall_back_to_desired(
        #[case] min: Option<i32>,
        #[case] max: Option<i32>,
        #[case] expected: ReplicaRange,
    ) {
        let job = job_with_bounds(min, max);
        let range = resolve_replica_range(&job, &oracle_returning(4)).expect("should resolve");
        assert_eq!(range, expected);
    }

    #[test]
    fn oracle_error_is_propagated_unchanged() {
        let job = job_with_bounds(Some(1), Some(2));
        let mut oracle = MockReplicaOracle::new();
        oracle
            .expect_desired_replicas()
            .returning(|_| Err(JobError::Oracle("quota lookup failed".into())));

        let err = resolve_replica_range(&job, &oracle).unwrap_err();
        assert!(matches!(err, JobError::Oracle(_)));
        assert_eq!(err.to_string(), "quota lookup failed");
    }

    #[test]
    fn non_elastic_job_is_rejected_before_consulting_oracle() {
        let gvk = GroupVersionKind::gvk("batch", "v1", "Job");
        let obj = DynamicObject::new("plain", &ApiResource::from_gvk(&gvk));
        let oracle = MockReplicaOracle::new();

        let err = resolve_replica_range(&obj, &oracle).unwrap_err();
        assert!(matches!(err, JobError::InvalidJobType { .. }));
    }

    #[test]
    fn range_renders_as_nnodes_value() {
        assert_eq!(ReplicaRange { min: 2, max: 4 }.to_string(), "2:4");
    }

    #[test]
    fn worker_oracle_reads_worker_replicas() {
        let mut job = job_with_bounds(None, None);
        job.spec.replica_specs.insert(
            REPLICA_TYPE_WORKER.to_string(),
            ReplicaSpec {
                replicas: Some(3),
                ..Default::default()
            },
        );
        assert_eq!(WorkerReplicasOracle.desired_replicas(&job).ok(), Some(3));

        let range = resolve_replica_range(&job, &WorkerReplicasOracle).expect("should resolve");
        assert_eq!(range, ReplicaRange { min: 3, max: 3 });
    }

    #[test]
    fn worker_oracle_defaults_to_one_replica() {
        let mut job = job_with_bounds(None, None);
        job.spec
            .replica_specs
            .insert(REPLICA_TYPE_WORKER.to_string(), ReplicaSpec::default());
        assert_eq!(WorkerReplicasOracle.desired_replicas(&job).ok(), Some(1));
    }

    #[test]
    fn worker_oracle_requires_worker_spec() {
        let job = job_with_bounds(None, None);
        let err = WorkerReplicasOracle.desired_replicas(&job).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to find Worker from spec of job 'imagenet'"
        );
    }
}
