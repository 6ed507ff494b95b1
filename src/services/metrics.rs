use crate::domain::MetricsGateway;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Counter => write!(f, "counter"),
        }
    }
}

/// Ordered label pairs; rendering keeps insertion order
pub type LabelSet = Vec<(String, String)>;

pub fn label_set(pairs: &[(&str, &str)]) -> LabelSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricHandle(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub value: f64,
    pub labels: LabelSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub kind: MetricKind,
    pub events: Vec<Event>,
}

impl Metric {
    fn render_into(&self, out: &mut String) {
        out.push_str(&format!("# TYPE {} {}\n", self.name, self.kind));
        for event in &self.events {
            out.push_str(&render_line(&self.name, event));
            out.push('\n');
        }
    }
}

/// Accumulates metric samples for one pass and hands them to a gateway
#[derive(Debug, Clone)]
pub struct Metrics {
    instance: String,
    metrics: Vec<Metric>,
    index: HashMap<String, usize>,
}

impl Metrics {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            metrics: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Returns the handle for `name`, registering it on first use.
    /// A later call with a different kind keeps the original kind.
    pub fn new_metric(&mut self, name: &str, kind: MetricKind) -> MetricHandle {
        if let Some(&idx) = self.index.get(name) {
            return MetricHandle(idx);
        }

        let idx = self.metrics.len();
        self.metrics.push(Metric {
            name: name.to_string(),
            kind,
            events: Vec::new(),
        });
        self.index.insert(name.to_string(), idx);
        MetricHandle(idx)
    }

    pub fn record(&mut self, handle: MetricHandle, value: f64, labels: LabelSet) {
        self.metrics[handle.0].events.push(Event { value, labels });
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.index.get(name).map(|&idx| &self.metrics[idx])
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Text exposition of every metric, in registration order
    pub fn render(&self) -> String {
        let mut out = String::new();
        for metric in &self.metrics {
            metric.render_into(&mut out);
        }
        out
    }

    pub fn push(&self, gateway: &dyn MetricsGateway) -> Result<()> {
        debug!(instance = %self.instance, metrics = self.metrics.len(), "Pushing metrics");
        gateway
            .push(&self.instance, &self.render())
            .context("failed to push metrics")
    }
}

fn render_line(name: &str, event: &Event) -> String {
    let labels = event
        .labels
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label_value(v)))
        .collect::<Vec<_>>()
        .join(",");

    format!("{name}{{{labels}}} {}", event.value)
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
