use anyhow::{Result, anyhow, bail};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Maps the `--loglevel` values onto tracing levels; `fatal` and `panic` collapse to error
pub fn parse_level(name: &str) -> Result<Level> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "fatal" | "panic" => Level::ERROR,
        _ => bail!("Wrong log level '{name}'"),
    })
}

/// Installs the global subscriber. `RUST_LOG` directives refine the chosen level.
pub fn init(level: &str, json: bool) -> Result<()> {
    let level = parse_level(level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
