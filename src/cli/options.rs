use crate::domain::KickPolicy;
use crate::infra::config::DEFAULT_DOCKER_ENDPOINT;
use crate::infra::docker_adapter::DEFAULT_BINARY;
use crate::infra::{DockerCliAdapter, PushgatewayClient};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "upkick",
    version,
    about = "Unattended upgrades for Docker containers",
    long_about = "Upkick pulls Docker images and removes containers using obsolete images.\n\n\
                  Make sure your Docker orchestrator is set to recreate the containers."
)]
pub struct Cli {
    /// Set loglevel ('trace', 'debug', 'info', 'warn', 'error')
    #[arg(short, long, env = "UPKICK_LOG_LEVEL", default_value = "info")]
    pub loglevel: String,

    /// Log as JSON (to stderr)
    #[arg(short, long, env = "UPKICK_JSON_OUTPUT")]
    pub json: bool,

    /// Only warn, do not kick out-of-date containers
    #[arg(short, long = "warn-only", env = "UPKICK_WARN_ONLY")]
    pub warn_only: bool,

    /// Retrieve hostname from Rancher metadata
    #[arg(short = 'H', long, env = "CONPLICITY_HOSTNAME_FROM_RANCHER")]
    pub hostname_from_rancher: bool,

    /// The Docker endpoint
    #[arg(short = 'e', long, env = "DOCKER_ENDPOINT", default_value = DEFAULT_DOCKER_ENDPOINT)]
    pub docker_endpoint: String,

    /// Runtime client binary (docker or podman)
    #[arg(long, env = "UPKICK_DOCKER_BINARY", default_value = DEFAULT_BINARY)]
    pub docker_binary: String,

    /// The prometheus push gateway URL to use
    #[arg(short = 'g', long, env = "PUSHGATEWAY_URL")]
    pub gateway_url: Option<String>,
}

impl Cli {
    pub fn policy(&self) -> KickPolicy {
        KickPolicy::new(self.warn_only)
    }

    pub fn runtime(&self) -> DockerCliAdapter {
        DockerCliAdapter::new(&self.docker_binary, Some(self.docker_endpoint.clone()))
    }

    pub fn gateway(&self) -> Option<PushgatewayClient> {
        self.gateway_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(PushgatewayClient::new)
    }
}
