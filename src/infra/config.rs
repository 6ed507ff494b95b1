use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DOCKER_ENDPOINT: &str = "unix:///var/run/docker.sock";
pub const RANCHER_HOSTNAME_URL: &str = "http://rancher-metadata/latest/self/host/name";

const HOSTNAME_FILES: [&str; 2] = ["/proc/sys/kernel/hostname", "/etc/hostname"];

/// Resolves the identity used as the metrics instance label
pub fn resolve_hostname(from_rancher: bool) -> Result<String> {
    if from_rancher {
        return rancher_hostname(RANCHER_HOSTNAME_URL);
    }

    for file in HOSTNAME_FILES {
        if let Some(name) = read_hostname_file(Path::new(file))? {
            debug!(source = file, hostname = %name, "Resolved hostname");
            return Ok(name);
        }
    }

    bail!("no hostname found in {}", HOSTNAME_FILES.join(" or "))
}

fn read_hostname_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let name = raw.trim();
    Ok((!name.is_empty()).then(|| name.to_string()))
}

pub fn rancher_hostname(url: &str) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("building metadata client")?;

    let body = client
        .get(url)
        .send()
        .with_context(|| format!("querying Rancher metadata at {url}"))?
        .error_for_status()
        .with_context(|| format!("Rancher metadata at {url} returned an error"))?
        .text()
        .context("reading Rancher metadata response")?;

    let name = body.trim();
    if name.is_empty() {
        bail!("Rancher metadata at {url} returned an empty hostname");
    }

    Ok(name.to_string())
}
