use tracing::{info, warn};

use crate::error::{ClientError, MetricsError, ReportError};
use crate::monitor::{MonitorClient, StatisticDataRequest};
use crate::parsing::reduce_metrics;
use crate::report::CsvReport;
use crate::types::{Config, DeploymentMetrics, ReportRow, TimeWindow};

/// Failures that end an export run.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("fetching metrics for {deployment}")]
    Client {
        deployment: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Fetches per-deployment peaks with the config and window borrowed for the run
pub struct MetricsCollector<'a> {
    monitor: &'a MonitorClient,
    config: &'a Config,
    window: &'a TimeWindow,
    debug: bool,
}

impl<'a> MetricsCollector<'a> {
    pub fn new(monitor: &'a MonitorClient, config: &'a Config, window: &'a TimeWindow) -> Self {
        Self {
            monitor,
            config,
            window,
            debug: false,
        }
    }

    /// Log raw API responses for each deployment
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Peak CPU and memory ratios for one deployment.
    ///
    /// An error answered by the API degrades to zeros; a client-side failure
    /// is returned and should abort the run.
    pub async fn collect_deployment(&self, deployment: &str) -> Result<DeploymentMetrics, ClientError> {
        info!("start collect {}/{} metrics.", self.config.namespace, deployment);

        let request = StatisticDataRequest::for_deployment(self.config, self.window, deployment);
        match self.monitor.describe_statistic_data(&request).await {
            Ok(response) => {
                if self.debug {
                    info!(
                        "collect {}/{} raw metrics {}.",
                        self.config.namespace, deployment, response.raw
                    );
                }
                Ok(reduce_metrics(&response.data))
            }
            Err(MetricsError::Api(err)) => {
                warn!("An API error has returned: {}", err);
                Ok(DeploymentMetrics::default())
            }
            Err(MetricsError::Client(err)) => Err(err),
        }
    }

    /// Fetches each deployment in order and appends its row to the report.
    pub async fn collect_into(&self, deployments: &[String], report: &mut CsvReport) -> Result<(), CollectError> {
        for deployment in deployments {
            let metrics = self
                .collect_deployment(deployment)
                .await
                .map_err(|source| CollectError::Client {
                    deployment: deployment.clone(),
                    source,
                })?;
            report.write_row(&ReportRow::new(&self.config.namespace, deployment, metrics))?;
        }
        Ok(())
    }
}
