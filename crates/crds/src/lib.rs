//! Enrollops CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the bare-metal enrollment
//! controllers, plus the annotation and label keys that form the
//! cross-object contract between hosts, agents and spoke clusters.

pub mod agent;
pub mod discovery_env;
pub mod host;
pub mod machine;
pub mod references;
pub mod target_cluster;

pub use agent::*;
pub use discovery_env::*;
pub use host::*;
pub use machine::*;
pub use references::*;
pub use target_cluster::*;
