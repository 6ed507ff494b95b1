use super::context::KickContext;
use super::inventory::CONTAINERS_METRIC;
use super::metrics::{MetricKind, Metrics, label_set};
use crate::domain::{Image, WarnOverride};
use anyhow::{Result, bail};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Time a container gets to shut down before the runtime kills it
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStep {
    Stop,
    Remove,
}

/// Final state of a container after reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    UpToDate,
    SkippedWarn,
    Removed,
    Failed(FailedStep),
    /// Could not be re-inspected (usually removed behind our back); not tallied
    Vanished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub up_to_date: usize,
    pub updated: usize,
    pub update_failed: usize,
    pub not_updated: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::UpToDate => self.up_to_date += 1,
            Disposition::Removed => self.updated += 1,
            Disposition::Failed(_) => self.update_failed += 1,
            Disposition::SkippedWarn => self.not_updated += 1,
            Disposition::Vanished => {}
        }
    }

    pub fn add(&mut self, other: &OutcomeTally) {
        self.up_to_date += other.up_to_date;
        self.updated += other.updated;
        self.update_failed += other.update_failed;
        self.not_updated += other.not_updated;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub tally: OutcomeTally,
    pub dispositions: Vec<(String, Disposition)>,
}

impl Reconciliation {
    fn push(&mut self, container: &str, disposition: Disposition) {
        self.tally.record(disposition);
        self.dispositions.push((container.to_string(), disposition));
    }

    pub fn disposition(&self, container: &str) -> Option<Disposition> {
        self.dispositions
            .iter()
            .find(|(id, _)| id == container)
            .map(|(_, d)| *d)
    }
}

/// Stops and removes containers running an out-of-date digest of an image
pub struct Reconciler<'a> {
    ctx: &'a KickContext,
}

impl<'a> Reconciler<'a> {
    pub fn new(ctx: &'a KickContext) -> Self {
        Self { ctx }
    }

    /// Reconciles every digest group of a refreshed image and records its tallies
    pub fn reconcile(&self, image: &Image, metrics: &mut Metrics) -> Result<Reconciliation> {
        let Some(current) = image.current_digest.as_deref() else {
            bail!("image {} has not been refreshed", image.id);
        };

        debug!(image = %image, "Kicking containers");
        let mut result = Reconciliation::default();

        for (digest, group) in &image.digest_groups {
            if digest == current {
                debug!(digest = %digest, "Not kicking containers for up-to-date digest");
                for id in &group.containers {
                    result.push(id, Disposition::UpToDate);
                }
                continue;
            }

            for id in &group.containers {
                let disposition = self.kick(id);
                result.push(id, disposition);
            }
        }

        let handle = metrics.new_metric(CONTAINERS_METRIC, MetricKind::Gauge);
        let tally = result.tally;
        for (what, value) in [
            ("up_to_date", tally.up_to_date),
            ("updated", tally.updated),
            ("update_failed", tally.update_failed),
            ("not_updated", tally.not_updated),
        ] {
            metrics.record(
                handle,
                value as f64,
                label_set(&[("what", what), ("image", image.id.as_str())]),
            );
        }

        Ok(result)
    }

    fn kick(&self, id: &str) -> Disposition {
        let runtime = &self.ctx.runtime;
        let policy = &self.ctx.policy;

        let container = match runtime.inspect_container(id) {
            Ok(c) => c,
            Err(e) => {
                error!(container = %id, "failed to inspect container: {e}");
                return Disposition::Vanished;
            }
        };

        let warn_override = WarnOverride::from_label(container.label(&policy.warn_label));
        if warn_override.warn_only(policy.warn_only) {
            warn!(container = %id, "Container uses an out-of-date image");
            return Disposition::SkippedWarn;
        }

        if container.running {
            info!(container = %id, "Stopping container");
            if let Err(e) = runtime.stop_container(id, STOP_GRACE_PERIOD) {
                error!(container = %id, "failed to stop container: {e}");
                return Disposition::Failed(FailedStep::Stop);
            }
        } else {
            info!(container = %id, "Container already stopped");
        }

        info!(container = %id, "Removing container");
        if let Err(e) = runtime.remove_container(id) {
            error!(container = %id, "failed to remove container: {e}");
            return Disposition::Failed(FailedStep::Remove);
        }

        Disposition::Removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_ignores_vanished() {
        let mut tally = OutcomeTally::default();
        tally.record(Disposition::UpToDate);
        tally.record(Disposition::Removed);
        tally.record(Disposition::Failed(FailedStep::Stop));
        tally.record(Disposition::Failed(FailedStep::Remove));
        tally.record(Disposition::SkippedWarn);
        tally.record(Disposition::Vanished);

        assert_eq!(
            tally,
            OutcomeTally {
                up_to_date: 1,
                updated: 1,
                update_failed: 2,
                not_updated: 1,
            }
        );
    }
}
