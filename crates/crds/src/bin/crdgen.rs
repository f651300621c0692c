//! Prints the CRD manifests for all Enrollops kinds as a YAML stream,
//! suitable for `kubectl apply -f -`.

use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let manifests = [
        serde_yaml::to_string(&crds::BareMetalHost::crd())?,
        serde_yaml::to_string(&crds::Agent::crd())?,
        serde_yaml::to_string(&crds::DiscoveryEnv::crd())?,
        serde_yaml::to_string(&crds::TargetCluster::crd())?,
        serde_yaml::to_string(&crds::Machine::crd())?,
    ];
    for manifest in manifests {
        println!("---");
        print!("{manifest}");
    }
    Ok(())
}
