//! Operator configuration
//!
//! Every field has a default, so an empty YAML document is a valid config.

use serde::{Deserialize, Serialize};

use elastic_common::ELASTIC_GROUP;

use crate::args::LAUNCH_SENTINEL;
use crate::error::JobError;

/// Knobs for template configuration and pod management
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ElasticConfig {
    /// Argument marking the distributed-launch invocation in a container's args
    pub launch_sentinel: String,
    /// Rendezvous backend passed as `--rdzv_backend`
    pub rdzv_backend: String,
    /// Separator between a claim's base name and its replica ordinal
    pub claim_separator: char,
    /// Value of the `group-name` label on managed pods
    pub group_name: String,
    /// Reporting component on emitted Events
    pub controller_name: String,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            launch_sentinel: LAUNCH_SENTINEL.to_string(),
            rdzv_backend: "etcd".to_string(),
            claim_separator: '-',
            group_name: ELASTIC_GROUP.to_string(),
            controller_name: "elastic-job-controller".to_string(),
        }
    }
}

impl ElasticConfig {
    /// Parse a YAML config document
    pub fn from_yaml(yaml: &str) -> Result<Self, JobError> {
        serde_yaml::from_str(yaml).map_err(|e| {
            elastic_common::Error::serialization_for_kind("ElasticConfig", e.to_string()).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ElasticConfig::from_yaml("{}").expect("empty config should parse");
        assert_eq!(config, ElasticConfig::default());
        assert_eq!(config.launch_sentinel, "torchelastic.distributed.launch");
        assert_eq!(config.rdzv_backend, "etcd");
        assert_eq!(config.claim_separator, '-');
    }

    #[test]
    fn partial_document_overrides_only_given_fields() {
        let config = ElasticConfig::from_yaml("rdzvBackend: c10d\nclaimSeparator: \"_\"\n")
            .expect("config should parse");
        assert_eq!(config.rdzv_backend, "c10d");
        assert_eq!(config.claim_separator, '_');
        assert_eq!(config.group_name, "elastic.pytorch.org");
    }

    #[test]
    fn malformed_document_is_a_serialization_error() {
        let err = ElasticConfig::from_yaml("rdzvBackend: [unclosed").unwrap_err();
        assert!(err.to_string().contains("serialization error"));
    }
}
