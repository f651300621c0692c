//! Controller-specific error types.
//!
//! This module defines error types specific to the host/agent enrollment
//! controller that are not covered by upstream library errors.

use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the host/agent enrollment controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Spoke cluster client could not be built or reached
    #[error("Spoke cluster error: {0}")]
    SpokeCluster(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// Whether this error is an optimistic-concurrency conflict. Conflicts
    /// are transient: the pass is simply re-driven against the fresh object.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Kube(KubeError::Api(ae)) if ae.code == 409)
    }
}
