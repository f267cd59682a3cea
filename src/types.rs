use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub region: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub namespace: String,
    #[serde(rename = "secretID")]
    pub secret_id: String,
    #[serde(rename = "secretKey")]
    pub secret_key: String,
}

impl Config {
    /// Checks required fields in a fixed order and reports the first empty one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("region", &self.region),
            ("clusterID", &self.cluster_id),
            ("namespace", &self.namespace),
            ("secretID", &self.secret_id),
            ("secretKey", &self.secret_key),
        ];
        for (field, value) in fields {
            if value.is_empty() {
                return Err(ConfigError::MissingField { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Peak usage-versus-request ratios for one deployment.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DeploymentMetrics {
    pub cpu_max_percent: f64,
    pub mem_max_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub namespace: String,
    pub deployment: String,
    pub cpu_max_percent: f64,
    pub mem_max_percent: f64,
}

impl ReportRow {
    pub fn new(namespace: &str, deployment: &str, metrics: DeploymentMetrics) -> Self {
        Self {
            namespace: namespace.to_string(),
            deployment: deployment.to_string(),
            cpu_max_percent: metrics.cpu_max_percent,
            mem_max_percent: metrics.mem_max_percent,
        }
    }
}
