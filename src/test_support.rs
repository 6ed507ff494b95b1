use crate::domain::error::Result;
use crate::domain::{ContainerRuntime, ContainerSnapshot, ImageInfo, MetricsGateway, RuntimeError};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

/// In-memory runtime with scripted containers and registry content
pub struct MockRuntime {
    containers: RwLock<BTreeMap<String, ContainerSnapshot>>,
    /// Digest a pull would fetch, keyed by image reference
    registry: RwLock<HashMap<String, String>>,
    /// Digest present locally, keyed by image reference
    local_images: RwLock<HashMap<String, String>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Vec<(String, Option<String>)>>,
}

impl std::fmt::Debug for MockRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRuntime").finish_non_exhaustive()
    }
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(BTreeMap::new()),
            registry: RwLock::new(HashMap::new()),
            local_images: RwLock::new(HashMap::new()),
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(Vec::new()),
        }
    }

    pub fn add_container(&self, id: &str, image_ref: &str, digest: &str, running: bool) {
        self.add_labeled_container(id, image_ref, digest, running, &[]);
    }

    pub fn add_labeled_container(
        &self,
        id: &str,
        image_ref: &str,
        digest: &str,
        running: bool,
        labels: &[(&str, &str)],
    ) {
        self.containers.write().unwrap().insert(
            id.to_string(),
            ContainerSnapshot {
                id: id.to_string(),
                image_ref: image_ref.to_string(),
                image_digest: digest.to_string(),
                running,
                labels: labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        );
    }

    /// Makes `digest` the content a pull of `image_ref` will fetch
    pub fn publish_image(&self, image_ref: &str, digest: &str) {
        self.registry
            .write()
            .unwrap()
            .insert(image_ref.to_string(), digest.to_string());
    }

    pub fn set_running(&self, id: &str, running: bool) {
        if let Some(container) = self.containers.write().unwrap().get_mut(id) {
            container.running = running;
        }
    }

    /// Removes a container without recording a command, as if done by someone else
    pub fn forget_container(&self, id: &str) {
        self.containers.write().unwrap().remove(id);
    }

    /// Fails every call of `operation`
    pub fn set_fail_on(&self, operation: &str) {
        self.fail_on
            .write()
            .unwrap()
            .push((operation.to_string(), None));
    }

    /// Fails `operation` only for the given container id or image reference
    pub fn set_fail_on_target(&self, operation: &str, target: &str) {
        self.fail_on
            .write()
            .unwrap()
            .push((operation.to_string(), Some(target.to_string())));
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    /// Number of recorded commands starting with `prefix` (e.g. `"stop:"`)
    pub fn count_commands(&self, prefix: &str) -> usize {
        self.commands
            .read()
            .unwrap()
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .count()
    }

    pub fn container_exists(&self, id: &str) -> bool {
        self.containers.read().unwrap().contains_key(id)
    }

    pub fn is_running(&self, id: &str) -> Option<bool> {
        self.containers.read().unwrap().get(id).map(|c| c.running)
    }

    fn record_command(&self, cmd: String) {
        self.commands.write().unwrap().push(cmd);
    }

    fn check_fail(&self, operation: &str, target: &str) -> Result<()> {
        let fails = self.fail_on.read().unwrap().iter().any(|(op, t)| {
            op == operation && t.as_deref().is_none_or(|t| t == target)
        });

        if fails {
            return Err(RuntimeError::Command {
                context: format!("{operation} {target}"),
                message: format!("Mock failure on: {operation}"),
            });
        }
        Ok(())
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for MockRuntime {
    fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerSnapshot>> {
        self.record_command("list".to_string());
        self.check_fail("list", "")?;

        Ok(self
            .containers
            .read()
            .unwrap()
            .values()
            .filter(|c| include_stopped || c.running)
            .cloned()
            .collect())
    }

    fn inspect_container(&self, id: &str) -> Result<ContainerSnapshot> {
        self.record_command(format!("inspect:{id}"));
        self.check_fail("inspect", id)?;

        self.containers
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound {
                kind: "container",
                id: id.to_string(),
            })
    }

    fn pull_image(&self, reference: &str) -> Result<()> {
        self.record_command(format!("pull:{reference}"));
        self.check_fail("pull", reference)?;

        let digest = self
            .registry
            .read()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| RuntimeError::Command {
                context: format!("pulling image {reference}"),
                message: "manifest unknown".to_string(),
            })?;

        self.local_images
            .write()
            .unwrap()
            .insert(reference.to_string(), digest);
        Ok(())
    }

    fn inspect_image(&self, reference: &str) -> Result<ImageInfo> {
        self.record_command(format!("inspect_image:{reference}"));
        self.check_fail("inspect_image", reference)?;

        self.local_images
            .read()
            .unwrap()
            .get(reference)
            .map(|digest| ImageInfo {
                digest: digest.clone(),
            })
            .ok_or_else(|| RuntimeError::NotFound {
                kind: "image",
                id: reference.to_string(),
            })
    }

    fn stop_container(&self, id: &str, grace_period: Duration) -> Result<()> {
        self.record_command(format!("stop:{id}:{}", grace_period.as_secs()));
        self.check_fail("stop", id)?;

        self.set_running(id, false);
        Ok(())
    }

    fn remove_container(&self, id: &str) -> Result<()> {
        self.record_command(format!("remove:{id}"));
        self.check_fail("remove", id)?;

        let mut containers = self.containers.write().unwrap();
        let running = containers.get(id).map(|c| c.running);
        match running {
            Some(true) => Err(RuntimeError::Command {
                context: format!("removing container {id}"),
                message: "container is running".to_string(),
            }),
            Some(false) => {
                containers.remove(id);
                Ok(())
            }
            None => Err(RuntimeError::NotFound {
                kind: "container",
                id: id.to_string(),
            }),
        }
    }
}

/// Gateway that keeps every pushed payload
#[derive(Debug, Default)]
pub struct RecordingGateway {
    pushes: RwLock<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose transport always fails
    pub fn failing() -> Self {
        Self {
            pushes: RwLock::new(Vec::new()),
            fail: true,
        }
    }

    /// `(instance, payload)` pairs in push order
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.read().unwrap().clone()
    }
}

impl MetricsGateway for RecordingGateway {
    fn push(&self, instance: &str, payload: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        self.pushes
            .write()
            .unwrap()
            .push((instance.to_string(), payload.to_string()));
        Ok(())
    }
}
