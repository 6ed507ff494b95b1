use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use upkick::cli::{Cli, logging};
use upkick::domain::MetricsGateway;
use upkick::infra::config::resolve_hostname;
use upkick::services::{KickContext, Kicker};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.loglevel, cli.json).context("failed to setup log level")?;

    info!("Upkick v{} starting", env!("CARGO_PKG_VERSION"));

    let hostname =
        resolve_hostname(cli.hostname_from_rancher).context("failed to get hostname")?;
    let ctx = KickContext::new(Arc::new(cli.runtime()), cli.policy());
    let mut kicker = Kicker::new(ctx, hostname);

    let report = kicker.run().inspect_err(|e| error!("{e:#}"))?;
    info!(
        images = report.images.len(),
        removed = report.removed().len(),
        "Pass complete"
    );

    let gateway = cli.gateway();
    kicker
        .push_metrics(gateway.as_ref().map(|g| g as &dyn MetricsGateway))
        .inspect_err(|e| error!("{e:#}"))
}
