//! Label set stamped on every pod a job owns.
//!
//! The label set is a deterministic function of the job name, so listing pods
//! by an exact-match selector returns exactly the pods of one job.

use std::collections::BTreeMap;

/// Label key carrying the API group that manages the pod
pub const GROUP_NAME_LABEL: &str = "group-name";

/// Label key carrying the owning job's name
pub const JOB_NAME_LABEL: &str = "job-name";

/// Generate the label set for pods belonging to `job_name`.
///
/// `/` is not valid in a label value and is replaced with `-`.
pub fn gen_labels(group_name: &str, job_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (GROUP_NAME_LABEL.to_string(), group_name.to_string()),
        (JOB_NAME_LABEL.to_string(), job_name.replace('/', "-")),
    ])
}

/// Render a label map as an equality-based selector (`k1=v1,k2=v2`).
pub fn to_selector(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}
