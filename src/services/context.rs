use crate::domain::{ContainerRuntime, KickPolicy};
use std::sync::Arc;

/// Everything a reconciliation pass needs, handed by reference to each component
#[derive(Debug, Clone)]
pub struct KickContext {
    pub runtime: Arc<dyn ContainerRuntime>,
    pub policy: KickPolicy,
}

impl KickContext {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, policy: KickPolicy) -> Self {
        Self { runtime, policy }
    }
}
