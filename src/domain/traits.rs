use super::error::Result;
use super::{ContainerSnapshot, ImageInfo};
use std::fmt::Debug;
use std::time::Duration;

/// Trait for container runtime operations
pub trait ContainerRuntime: Send + Sync + Debug {
    /// List every container, optionally including stopped ones
    fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerSnapshot>>;

    /// Get the current state of a container
    fn inspect_container(&self, id: &str) -> Result<ContainerSnapshot>;

    /// Fetch an image from its registry, returning once the transfer completes
    fn pull_image(&self, reference: &str) -> Result<()>;

    /// Inspect a local image
    fn inspect_image(&self, reference: &str) -> Result<ImageInfo>;

    /// Stop a container, escalating to a kill once `grace_period` elapses
    fn stop_container(&self, id: &str, grace_period: Duration) -> Result<()>;

    /// Remove a stopped container
    fn remove_container(&self, id: &str) -> Result<()>;
}

/// Destination for rendered metrics
pub trait MetricsGateway: Debug {
    /// Send an exposition-format payload on behalf of `instance`
    fn push(&self, instance: &str, payload: &str) -> anyhow::Result<()>;
}
