use crate::domain::error::Result;
use crate::domain::{ContainerRuntime, ContainerSnapshot, ImageInfo, RuntimeError};
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::process::Command;
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_BINARY: &str = "docker";

/// Talks to the container runtime through its CLI (`docker` or a compatible `podman`)
#[derive(Debug, Clone)]
pub struct DockerCliAdapter {
    binary: String,
    endpoint: Option<String>,
}

impl DockerCliAdapter {
    pub fn new(binary: impl Into<String>, endpoint: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            endpoint: endpoint.filter(|e| !e.is_empty()),
        }
    }

    fn run<I, S>(&self, args: I, context: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        if let Some(endpoint) = &self.endpoint {
            cmd.args(["--host", endpoint.as_str()]);
        }
        cmd.args(args);
        trace!(command = ?cmd, "Running runtime client");

        let output = cmd.output().map_err(|source| RuntimeError::Spawn {
            context: context.to_string(),
            source,
        })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(RuntimeError::Command {
            context: context.to_string(),
            message: if message.is_empty() {
                format!("{} exited with {}", self.binary, output.status)
            } else {
                message
            },
        })
    }
}

impl Default for DockerCliAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY, None)
    }
}

#[derive(Deserialize)]
struct PsLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Labels", default)]
    labels: String,
}

#[derive(Deserialize)]
struct InspectedContainer {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Config")]
    config: InspectedConfig,
    #[serde(rename = "State")]
    state: InspectedState,
}

#[derive(Deserialize)]
struct InspectedConfig {
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Labels", default)]
    labels: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct InspectedState {
    #[serde(rename = "Running")]
    running: bool,
}

impl From<InspectedContainer> for ContainerSnapshot {
    fn from(c: InspectedContainer) -> Self {
        Self {
            id: c.id,
            image_ref: c.config.image,
            image_digest: c.image,
            running: c.state.running,
            labels: c.config.labels.unwrap_or_default(),
        }
    }
}

/// `ps` reports labels as a single `k=v,k2=v2` string
fn parse_ps_labels(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn not_found(kind: &'static str, id: &str, err: RuntimeError) -> RuntimeError {
    let missing = matches!(
        &err,
        RuntimeError::Command { message, .. } if message.to_lowercase().contains("no such")
    );
    if missing {
        RuntimeError::NotFound {
            kind,
            id: id.to_string(),
        }
    } else {
        err
    }
}

impl ContainerRuntime for DockerCliAdapter {
    fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerSnapshot>> {
        let mut args = vec!["ps", "--no-trunc", "--format", "{{json .}}"];
        if include_stopped {
            args.push("--all");
        }

        let context = "listing containers";
        let out = self.run(args, context)?;

        out.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| -> Result<ContainerSnapshot> {
                let ps: PsLine =
                    serde_json::from_str(line).map_err(|source| RuntimeError::Decode {
                        context: context.to_string(),
                        source,
                    })?;
                // ps does not expose the image digest; inspect fills it in
                Ok(ContainerSnapshot {
                    running: ps.state == "running",
                    labels: parse_ps_labels(&ps.labels),
                    id: ps.id,
                    image_ref: ps.image,
                    image_digest: String::new(),
                })
            })
            .collect()
    }

    fn inspect_container(&self, id: &str) -> Result<ContainerSnapshot> {
        let context = format!("inspecting container {id}");
        let out = self
            .run(["container", "inspect", id], &context)
            .map_err(|e| not_found("container", id, e))?;

        let mut parsed: Vec<InspectedContainer> =
            serde_json::from_str(&out).map_err(|source| RuntimeError::Decode {
                context: context.clone(),
                source,
            })?;

        match parsed.pop() {
            Some(container) => Ok(container.into()),
            None => Err(RuntimeError::NotFound {
                kind: "container",
                id: id.to_string(),
            }),
        }
    }

    fn pull_image(&self, reference: &str) -> Result<()> {
        self.run(["pull", "--quiet", reference], &format!("pulling image {reference}"))?;
        Ok(())
    }

    fn inspect_image(&self, reference: &str) -> Result<ImageInfo> {
        let out = self
            .run(
                ["image", "inspect", "--format", "{{.Id}}", reference],
                &format!("inspecting image {reference}"),
            )
            .map_err(|e| not_found("image", reference, e))?;

        Ok(ImageInfo {
            digest: out.trim().to_string(),
        })
    }

    fn stop_container(&self, id: &str, grace_period: Duration) -> Result<()> {
        let secs = grace_period.as_secs().to_string();
        self.run(
            ["stop", "--time", secs.as_str(), id],
            &format!("stopping container {id}"),
        )?;
        Ok(())
    }

    fn remove_container(&self, id: &str) -> Result<()> {
        self.run(["rm", id], &format!("removing container {id}"))?;
        Ok(())
    }
}
