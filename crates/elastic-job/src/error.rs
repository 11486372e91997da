//! Job-specific error types

/// Boxed error a custom replica oracle reports through `JobError::Oracle`
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{kind} is not a type of ElasticJob")]
    InvalidJobType { kind: String },

    #[error("missing namespace on ElasticJob '{job}'")]
    MissingNamespace { job: String },

    #[error("missing name on ElasticJob")]
    MissingName,

    #[error("pod template of job '{job}' has no main container")]
    NoMainContainer { job: String },

    #[error("pod template of job '{job}' already carries rendezvous arguments")]
    AlreadyConfigured { job: String },

    #[error("failed to find {replica_type} from spec of job '{job}'")]
    MissingReplicaSpec { job: String, replica_type: String },

    /// API server failure, passed through as returned by the store
    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// Desired-replica computation failure, passed through as returned
    #[error(transparent)]
    Oracle(BoxError),

    #[error("{0}")]
    Common(#[from] elastic_common::Error),
}

impl JobError {
    /// Whether a later reconcile pass can succeed without a spec change
    pub fn is_retryable(&self) -> bool {
        match self {
            JobError::Kube(e) => {
                !matches!(e, kube::Error::Api(ae) if (400..500).contains(&ae.code))
            }
            JobError::Oracle(_) => true,
            JobError::Common(e) => e.is_retryable(),
            JobError::InvalidJobType { .. }
            | JobError::MissingNamespace { .. }
            | JobError::MissingName
            | JobError::NoMainContainer { .. }
            | JobError::AlreadyConfigured { .. }
            | JobError::MissingReplicaSpec { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kube_errors_keep_their_message() {
        let err = JobError::from(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "pods \"w-0\" already exists".to_string(),
            reason: "AlreadyExists".to_string(),
            code: 409,
        }));
        let inner = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "pods \"w-0\" already exists".to_string(),
            reason: "AlreadyExists".to_string(),
            code: 409,
        });
        assert_eq!(err.to_string(), inner.to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn oracle_errors_are_transparent() {
        let err = JobError::Oracle("metrics server unavailable".into());
        assert_eq!(err.to_string(), "metrics server unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_job_type_names_the_kind() {
        let err = JobError::InvalidJobType {
            kind: "PyTorchJob".to_string(),
        };
        assert_eq!(err.to_string(), "PyTorchJob is not a type of ElasticJob");
        assert!(!err.is_retryable());
    }
}
