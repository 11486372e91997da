//! Per-replica persistent volume claim binding
//!
//! Per-replica claims are named `<base><sep><ordinal>`, and a template is
//! rendered with ordinal 0. Rewriting the final segment binds a replica to its
//! own claim. Only the last separator splits, so bases may contain the
//! separator themselves.

use k8s_openapi::api::core::v1::Volume;
use tracing::trace;

/// Claim name bound to `index`, or `None` when `claim` has no separator.
pub fn indexed_claim_name(claim: &str, separator: char, index: &str) -> Option<String> {
    let pos = claim.rfind(separator)?;
    Some(format!("{}{}{}", &claim[..pos], separator, index))
}

/// Rewrite every claim-backed volume to the claim of replica `index`.
///
/// Volumes of other sources, and claims without a separator, are left alone.
/// Returns the number of rewritten claims.
pub fn reindex_claims(volumes: &mut [Volume], separator: char, index: &str) -> usize {
    let mut rewritten = 0;
    for volume in volumes.iter_mut() {
        let Some(pvc) = volume.persistent_volume_claim.as_mut() else {
            continue;
        };
        let Some(claim_name) = indexed_claim_name(&pvc.claim_name, separator, index) else {
            // not our naming convention
            continue;
        };
        trace!(volume = %volume.name, from = %pvc.claim_name, to = %claim_name, "rebinding claim");
        pvc.claim_name = claim_name;
        rewritten += 1;
    }
    rewritten
}
