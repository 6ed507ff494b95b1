pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    ContainerRuntime, ContainerSnapshot, DigestGroup, Image, KickPolicy, MetricsGateway,
    WarnOverride,
};
pub use infra::{DockerCliAdapter, PushgatewayClient};
pub use services::{KickContext, Kicker, Metrics, PassReport, Reconciler};
