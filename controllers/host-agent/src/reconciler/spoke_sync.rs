//! Propagation of an installed host into the spoke cluster's store.
//!
//! Once the matched agent's target cluster reports installed, the host,
//! a compute-machine record and the admin kubeconfig secret are duplicated
//! into the spoke store. Every step is an independent upsert keyed by a
//! stable name, so a pass interrupted between steps is recovered by simple
//! replay. Updates graft only the managed fields onto the fetched spoke
//! object; anything the spoke's own controllers wrote stays untouched.

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::PostParams;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ControllerError;
use crds::{
    Agent, BareMetalHost, Machine, MachineSpec, HOST_DETACHED_ANNOTATION,
    HOST_HARDWARE_DETAILS_ANNOTATION, MACHINE_CLUSTER_ID_LABEL, MACHINE_ROLE_LABEL,
    MACHINE_TYPE_LABEL,
};

use super::annotations::{get_annotation, remove_annotation, set_annotation, set_label};

/// Name of the spoke Machine record for a host.
pub fn machine_name(cluster_name: &str, host_name: &str) -> String {
    format!("{cluster_name}-{host_name}")
}

/// Builds the spoke copy of a host: same name and namespace, hardware
/// details carried over, detached stripped so the spoke's own node agent
/// is free to act on it.
pub fn spoke_host(host: &BareMetalHost) -> BareMetalHost {
    let mut spoke = BareMetalHost::new(
        host.metadata.name.as_deref().unwrap_or_default(),
        host.spec.clone(),
    );
    spoke.metadata.namespace = host.metadata.namespace.clone();
    if let Some(details) = get_annotation(host, HOST_HARDWARE_DETAILS_ANNOTATION) {
        let details = details.to_string();
        set_annotation(&mut spoke, HOST_HARDWARE_DETAILS_ANNOTATION, &details);
    }
    spoke
}

/// Builds the spoke Machine for a host, labeled with the cluster identity
/// and the agent's installation role in both the role and the legacy type
/// label.
pub fn spoke_machine(cluster_name: &str, host: &BareMetalHost, agent: &Agent) -> Machine {
    let host_name = host.metadata.name.as_deref().unwrap_or_default();
    let mut machine = Machine::new(&machine_name(cluster_name, host_name), MachineSpec::default());
    machine.metadata.namespace = host.metadata.namespace.clone();
    set_label(&mut machine, MACHINE_CLUSTER_ID_LABEL, cluster_name);
    set_label(&mut machine, MACHINE_ROLE_LABEL, &agent.spec.role);
    set_label(&mut machine, MACHINE_TYPE_LABEL, &agent.spec.role);
    machine
}

/// Builds the spoke copy of the admin kubeconfig secret: same name and
/// namespace, data copied verbatim.
pub fn spoke_secret(secret: &Secret) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: secret.metadata.name.clone(),
            namespace: secret.metadata.namespace.clone(),
            ..Default::default()
        },
        data: secret.data.clone(),
        type_: secret.type_.clone(),
        ..Default::default()
    }
}

/// Grafts the managed fields onto an existing spoke host: hardware details
/// refreshed, detached stripped. Spoke-side annotations, labels and spec
/// fields stay as the spoke's controllers left them. Returns whether the
/// object changed.
pub fn apply_spoke_host(existing: &mut BareMetalHost, hardware_details: Option<&str>) -> bool {
    let mut changed = false;
    if let Some(details) = hardware_details {
        changed |= set_annotation(existing, HOST_HARDWARE_DETAILS_ANNOTATION, details);
    }
    changed |= remove_annotation(existing, HOST_DETACHED_ANNOTATION);
    changed
}

/// Grafts the identity labels onto an existing spoke machine, leaving the
/// rest of the object (notably the spoke-assigned provider id) untouched.
/// Returns whether the object changed.
pub fn apply_spoke_machine(existing: &mut Machine, cluster_name: &str, role: &str) -> bool {
    let mut changed = set_label(existing, MACHINE_CLUSTER_ID_LABEL, cluster_name);
    changed |= set_label(existing, MACHINE_ROLE_LABEL, role);
    changed |= set_label(existing, MACHINE_TYPE_LABEL, role);
    changed
}

/// Refreshes the spoke secret's data from the management copy. Returns
/// whether the object changed.
pub fn apply_spoke_secret(existing: &mut Secret, source: &Secret) -> bool {
    if existing.data == source.data {
        return false;
    }
    existing.data = source.data.clone();
    true
}

/// Duplicates the host, its compute-machine record and the admin
/// kubeconfig secret into the spoke store. Each upsert is idempotent and
/// keyed by stable identity; a failure anywhere surfaces as a retryable
/// pass error and the whole propagation is replayed.
pub async fn propagate(
    spoke: Client,
    host: &BareMetalHost,
    agent: &Agent,
    cluster_name: &str,
    admin_secret: &Secret,
) -> Result<(), ControllerError> {
    let namespace = host.metadata.namespace.as_deref().unwrap_or("default");
    let details = get_annotation(host, HOST_HARDWARE_DETAILS_ANNOTATION).map(str::to_string);

    let host_api: Api<BareMetalHost> = Api::namespaced(spoke.clone(), namespace);
    upsert(&host_api, "BareMetalHost", spoke_host(host), |existing| {
        apply_spoke_host(existing, details.as_deref())
    })
    .await?;

    let machine_api: Api<Machine> = Api::namespaced(spoke.clone(), namespace);
    upsert(
        &machine_api,
        "Machine",
        spoke_machine(cluster_name, host, agent),
        |existing| apply_spoke_machine(existing, cluster_name, &agent.spec.role),
    )
    .await?;

    let secret_namespace = admin_secret.metadata.namespace.as_deref().unwrap_or(namespace);
    let secret_api: Api<Secret> = Api::namespaced(spoke, secret_namespace);
    upsert(&secret_api, "Secret", spoke_secret(admin_secret), |existing| {
        apply_spoke_secret(existing, admin_secret)
    })
    .await?;

    Ok(())
}

/// Create-if-absent / graft-if-drifted against the spoke store. A missing
/// object is created from `initial`; an existing one is fetched, the apply
/// function mutates only the managed fields on it, and it is replaced as-is
/// (resource version included) only when something changed.
async fn upsert<K>(
    api: &Api<K>,
    kind: &str,
    initial: K,
    apply: impl Fn(&mut K) -> bool,
) -> Result<(), ControllerError>
where
    K: Resource + Clone + std::fmt::Debug + Serialize + DeserializeOwned,
    K::DynamicType: Default,
{
    let name = initial.meta().name.clone().ok_or_else(|| {
        ControllerError::InvalidConfig(format!("spoke {kind} is missing a name"))
    })?;
    match api.get(&name).await {
        Ok(existing) => {
            let mut updated = existing;
            if apply(&mut updated) {
                api.replace(&name, &PostParams::default(), &updated).await?;
                info!("Updated spoke {} {}", kind, name);
            } else {
                debug!("Spoke {} {} already up to date", kind, name);
            }
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            api.create(&PostParams::default(), &initial).await?;
            info!("Created spoke {} {}", kind, name);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
