pub mod config;
pub mod docker_adapter;
pub mod pushgateway;

pub use docker_adapter::DockerCliAdapter;
pub use pushgateway::PushgatewayClient;
