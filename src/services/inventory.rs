use super::context::KickContext;
use super::metrics::{MetricKind, Metrics, label_set};
use crate::domain::{Image, WarnOverride};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, error, warn};

pub const CONTAINERS_METRIC: &str = "upkick_containers";

#[derive(Debug, Default, Clone, Copy)]
struct Discovery {
    total: usize,
    blacklisted_tag: usize,
    blacklisted_container: usize,
}

/// Groups every known container by image reference and content digest
pub struct InventoryBuilder<'a> {
    ctx: &'a KickContext,
}

impl<'a> InventoryBuilder<'a> {
    pub fn new(ctx: &'a KickContext) -> Self {
        Self { ctx }
    }

    /// Builds the image inventory, skipping containers that cannot be inspected.
    /// Fails only when the container list itself is unavailable.
    pub fn build(&self, metrics: &mut Metrics) -> Result<BTreeMap<String, Image>> {
        debug!("Getting images");
        let containers = self
            .ctx
            .runtime
            .list_containers(true)
            .context("failed to list containers")?;

        let policy = &self.ctx.policy;
        let mut images: BTreeMap<String, Image> = BTreeMap::new();
        let mut discovery: BTreeMap<String, Discovery> = BTreeMap::new();
        let mut seen = HashSet::new();

        for listed in containers {
            if !seen.insert(listed.id.clone()) {
                continue;
            }

            let container = match self.ctx.runtime.inspect_container(&listed.id) {
                Ok(c) => c,
                Err(e) => {
                    error!(container = %listed.id, "failed to inspect container: {e}");
                    continue;
                }
            };

            let tag = container.image_ref.clone();
            let counts = discovery.entry(tag.clone()).or_default();
            counts.total += 1;

            if policy.is_blacklisted(&tag) {
                debug!(image = %tag, "Ignoring blacklisted image tag");
                counts.blacklisted_tag += 1;
                continue;
            }

            let label = container.label(&policy.warn_label);
            if WarnOverride::is_unrecognized(label) {
                warn!(
                    container = %container.id,
                    "Ignoring unrecognized {} label value {:?}",
                    policy.warn_label,
                    label.unwrap_or_default()
                );
            }
            if WarnOverride::from_label(label) == WarnOverride::ForceSkip {
                debug!(container = %container.id, "Ignoring blacklisted container");
                counts.blacklisted_container += 1;
                continue;
            }

            debug!(
                container = %container.id,
                digest = %container.image_digest,
                image = %tag,
                "Adding container to inventory"
            );
            images
                .entry(tag.clone())
                .or_insert_with(|| Image::new(tag))
                .insert(&container.image_digest, &container.id);
        }

        let handle = metrics.new_metric(CONTAINERS_METRIC, MetricKind::Gauge);
        for (tag, counts) in &discovery {
            for (what, value) in [
                ("total", counts.total),
                ("blacklisted_tag", counts.blacklisted_tag),
                ("blacklisted_container", counts.blacklisted_container),
            ] {
                metrics.record(
                    handle,
                    value as f64,
                    label_set(&[("what", what), ("image", tag.as_str())]),
                );
            }
        }

        Ok(images)
    }
}
