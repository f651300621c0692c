//! Host enrollment controller
//!
//! Matches discovered Agents to BareMetalHost records by boot MAC,
//! approves and configures the matched agent, mirrors its hardware
//! inventory onto the host and, once the target cluster installs, hands
//! the host over to the spoke cluster.

mod backoff;
mod controller;
mod error;
mod reconciler;
mod spoke;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::error::ControllerError;
use controller::Controller;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting host enrollment controller");

    let namespace = env::var("WATCH_NAMESPACE").ok();
    info!(
        "Watching namespace: {}",
        namespace.as_deref().unwrap_or("default")
    );

    let controller = Controller::new(namespace).await?;
    controller.run().await?;

    Ok(())
}
