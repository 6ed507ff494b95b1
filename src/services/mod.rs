mod context;
mod inventory;
mod kicker;
mod metrics;
mod reconciler;
mod refresher;

pub use context::KickContext;
pub use inventory::{CONTAINERS_METRIC, InventoryBuilder};
pub use kicker::{ImageOutcome, ImageReport, Kicker, PassReport};
pub use metrics::{Event, LabelSet, Metric, MetricHandle, MetricKind, Metrics, label_set};
pub use reconciler::{
    Disposition, FailedStep, OutcomeTally, Reconciler, Reconciliation, STOP_GRACE_PERIOD,
};
pub use refresher::ImageRefresher;
