use super::context::KickContext;
use super::inventory::InventoryBuilder;
use super::metrics::Metrics;
use super::reconciler::{Disposition, OutcomeTally, Reconciler, Reconciliation};
use super::refresher::ImageRefresher;
use crate::domain::MetricsGateway;
use anyhow::Result;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Reconciled(Reconciliation),
    /// Refresh or reconciliation of the image failed; the message carries the cause chain
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub image: String,
    pub outcome: ImageOutcome,
}

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub images: Vec<ImageReport>,
}

impl PassReport {
    pub fn image(&self, id: &str) -> Option<&ImageReport> {
        self.images.iter().find(|report| report.image == id)
    }

    pub fn totals(&self) -> OutcomeTally {
        let mut totals = OutcomeTally::default();
        for report in &self.images {
            if let ImageOutcome::Reconciled(r) = &report.outcome {
                totals.add(&r.tally);
            }
        }
        totals
    }

    /// Containers that were stopped and removed during the pass
    pub fn removed(&self) -> Vec<&str> {
        self.images
            .iter()
            .filter_map(|report| match &report.outcome {
                ImageOutcome::Reconciled(r) => Some(r),
                ImageOutcome::Failed(_) => None,
            })
            .flat_map(|r| r.dispositions.iter())
            .filter(|(_, d)| *d == Disposition::Removed)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn failed_images(&self) -> usize {
        self.images
            .iter()
            .filter(|report| matches!(report.outcome, ImageOutcome::Failed(_)))
            .count()
    }
}

/// Drives one full pass: inventory, then refresh and reconcile each image in turn
pub struct Kicker {
    ctx: KickContext,
    metrics: Metrics,
}

impl Kicker {
    pub fn new(ctx: KickContext, instance: impl Into<String>) -> Self {
        Self {
            ctx,
            metrics: Metrics::new(instance),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Runs the pass. Only an unavailable container list aborts it; any other
    /// failure is confined to the affected image or container.
    pub fn run(&mut self) -> Result<PassReport> {
        let images = InventoryBuilder::new(&self.ctx).build(&mut self.metrics)?;
        info!(images = images.len(), "Inventory built");

        let refresher = ImageRefresher::new(&self.ctx);
        let reconciler = Reconciler::new(&self.ctx);
        let mut report = PassReport::default();

        for (id, mut image) in images {
            let outcome = match refresher.refresh(&mut image) {
                Err(e) => {
                    error!(image = %id, "Failed to refresh image: {e:#}");
                    ImageOutcome::Failed(format!("{e:#}"))
                }
                Ok(()) => match reconciler.reconcile(&image, &mut self.metrics) {
                    Ok(r) => ImageOutcome::Reconciled(r),
                    Err(e) => {
                        error!(image = %id, "Failed to kick containers: {e:#}");
                        ImageOutcome::Failed(format!("{e:#}"))
                    }
                },
            };
            report.images.push(ImageReport { image: id, outcome });
        }

        let totals = report.totals();
        info!(
            up_to_date = totals.up_to_date,
            updated = totals.updated,
            update_failed = totals.update_failed,
            not_updated = totals.not_updated,
            failed_images = report.failed_images(),
            "Reconciliation finished"
        );
        for id in report.removed() {
            info!(container = %id, "Container kicked");
        }

        Ok(report)
    }

    /// Hands accumulated metrics to the gateway, if one is configured
    pub fn push_metrics(&self, gateway: Option<&dyn MetricsGateway>) -> Result<()> {
        match gateway {
            Some(gateway) => self.metrics.push(gateway),
            None => {
                debug!("No metrics gateway configured, skipping push");
                Ok(())
            }
        }
    }
}
