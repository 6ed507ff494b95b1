use crate::domain::MetricsGateway;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

pub const JOB_NAME: &str = "upkick";
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Prometheus Pushgateway client
#[derive(Debug, Clone)]
pub struct PushgatewayClient {
    base_url: String,
    client: Client,
}

impl PushgatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn url_for(&self, instance: &str) -> String {
        format!(
            "{}/metrics/job/{JOB_NAME}/instance/{}",
            self.base_url,
            instance.trim()
        )
    }
}

impl MetricsGateway for PushgatewayClient {
    fn push(&self, instance: &str, payload: &str) -> Result<()> {
        let url = self.url_for(instance);
        debug!(url = %url, "Sending metrics to pushgateway");

        self.client
            .post(&url)
            .header(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)
            .body(payload.to_string())
            .send()
            .with_context(|| format!("sending metrics to {url}"))?
            .error_for_status()
            .with_context(|| format!("pushgateway at {url} rejected metrics"))?;

        Ok(())
    }
}
