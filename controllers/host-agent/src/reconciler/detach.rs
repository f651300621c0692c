//! Detached-annotation management.
//!
//! Once an agent's installation is underway the node agent must not
//! re-provision the host, so the detached annotation goes on. For a host
//! whose agent references an installed target cluster the annotation is
//! permanent: spoke propagation re-asserts it and removal is suppressed
//! even when the install condition is transiently absent. The annotation
//! only ever comes off a non-migrated host, and only when an operator
//! cleared the host's image to hand it back to out-of-band management.

use crds::{
    Agent, BareMetalHost, HOST_DETACHED_ANNOTATION, HOST_DETACHED_TRUE, INSTALLATION_FAILED_REASON,
    INSTALLATION_IN_PROGRESS_REASON, INSTALLED_CONDITION, INSTALLED_REASON,
};
use tracing::info;

use super::annotations::{has_annotation, remove_annotation, set_annotation};

/// Whether the agent's install condition reports installation past the
/// not-started stage (in progress, failed or completed).
pub fn install_underway(agent: &Agent) -> bool {
    agent
        .status
        .as_ref()
        .map(|status| status.conditions.as_slice())
        .unwrap_or_default()
        .iter()
        .filter(|condition| condition.condition_type == INSTALLED_CONDITION)
        .any(|condition| {
            matches!(
                condition.reason.as_str(),
                INSTALLATION_IN_PROGRESS_REASON | INSTALLATION_FAILED_REASON | INSTALLED_REASON
            )
        })
}

/// Drives the detached annotation from the matched agent's install
/// progress. `migration_active` reports whether the agent references an
/// installed target cluster; such hosts never lose the annotation here.
/// Returns whether the host changed.
pub fn reconcile_detached(
    host: &mut BareMetalHost,
    agent: Option<&Agent>,
    migration_active: bool,
) -> bool {
    if agent.is_some_and(install_underway) {
        return set_annotation(host, HOST_DETACHED_ANNOTATION, HOST_DETACHED_TRUE);
    }

    if migration_active {
        return false;
    }

    // The install condition is absent or not started. The annotation is
    // only removed when the image was cleared by an external actor wanting
    // the node agent back in control; with the image still set it stays.
    if has_annotation(host, HOST_DETACHED_ANNOTATION) && host.spec.image.is_none() {
        let removed = remove_annotation(host, HOST_DETACHED_ANNOTATION);
        if removed {
            info!(
                "Returning BareMetalHost {} to node-agent management",
                host.metadata.name.as_deref().unwrap_or_default()
            );
        }
        return removed;
    }
    false
}
