//! Client for the Tencent Cloud monitoring API (`DescribeStatisticData`).

pub mod sign;

use std::time::Duration;

use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ClientError, MetricsError};
use crate::types::{Config, TimeWindow};

pub const DEFAULT_ENDPOINT: &str = "https://monitor.tencentcloudapi.com";
pub const SERVICE: &str = "monitor";
pub const API_VERSION: &str = "2018-07-24";
pub const ACTION: &str = "DescribeStatisticData";

pub const MONITOR_NAMESPACE: &str = "QCE/TKE2";
pub const CPU_METRIC: &str = "K8sWorkloadRateCpuCoreUsedRequestMax";
pub const MEMORY_METRIC: &str = "K8sWorkloadRateMemWorkingSetBytesRequestMax";
pub const WORKLOAD_KIND: &str = "Deployment";
pub const PERIOD_SECONDS: u64 = 3600;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryCondition {
    pub key: String,
    pub operator: String,
    pub value: Vec<String>,
}

impl QueryCondition {
    pub fn equals(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            operator: "=".to_string(),
            value: vec![value.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatisticDataRequest {
    pub module: String,
    pub namespace: String,
    pub metric_names: Vec<String>,
    pub conditions: Vec<QueryCondition>,
    pub period: u64,
    pub start_time: String,
    pub end_time: String,
}

impl StatisticDataRequest {
    /// Query for one deployment's peak CPU and memory ratios over the window.
    pub fn for_deployment(config: &Config, window: &TimeWindow, deployment: &str) -> Self {
        Self {
            module: SERVICE.to_string(),
            namespace: MONITOR_NAMESPACE.to_string(),
            metric_names: vec![CPU_METRIC.to_string(), MEMORY_METRIC.to_string()],
            conditions: vec![
                QueryCondition::equals("tke_cluster_instance_id", &config.cluster_id),
                QueryCondition::equals("namespace", &config.namespace),
                QueryCondition::equals("workload_kind", WORKLOAD_KIND),
                QueryCondition::equals("workload_name", deployment),
            ],
            period: PERIOD_SECONDS,
            start_time: window.start_rfc3339(),
            end_time: window.end_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataPoint {
    pub timestamp: Option<u64>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PointSeries {
    pub dimensions: Option<Vec<Dimension>>,
    pub values: Option<Vec<DataPoint>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricData {
    pub metric_name: Option<String>,
    pub points: Option<Vec<PointSeries>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseBody {
    error: Option<ErrorBody>,
    data: Option<Vec<MetricData>>,
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: ResponseBody,
}

/// A successful `DescribeStatisticData` answer.
#[derive(Debug, Clone)]
pub struct StatisticData {
    pub data: Vec<MetricData>,
    pub request_id: Option<String>,
    /// Response body as received, for debug output.
    pub raw: String,
}

pub struct MonitorClient {
    http: reqwest::Client,
    url: Url,
    host: String,
    region: String,
    secret_id: String,
    secret_key: String,
}

impl MonitorClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_endpoint(config, DEFAULT_ENDPOINT)
    }

    /// Points the client at a different endpoint, e.g. a regional one or a test server.
    pub fn with_endpoint(config: &Config, endpoint: &str) -> Result<Self, ClientError> {
        let url = Url::parse(endpoint).map_err(|e| ClientError::Endpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(ClientError::Endpoint {
                    endpoint: endpoint.to_string(),
                    reason: "missing host".to_string(),
                })
            }
        };
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            url,
            host,
            region: config.region.clone(),
            secret_id: config.secret_id.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    pub async fn describe_statistic_data(
        &self,
        request: &StatisticDataRequest,
    ) -> Result<StatisticData, MetricsError> {
        let payload = serde_json::to_vec(request).map_err(ClientError::Encode)?;
        let timestamp = Utc::now().timestamp();
        let authorization = sign::authorization(&sign::SigningInput {
            secret_id: &self.secret_id,
            secret_key: &self.secret_key,
            service: SERVICE,
            host: &self.host,
            timestamp,
            payload: &payload,
        });

        let resp = self
            .http
            .post(self.url.clone())
            .header("Authorization", authorization)
            .header("Content-Type", sign::CONTENT_TYPE)
            .header("Host", &self.host)
            .header("X-TC-Action", ACTION)
            .header("X-TC-Version", API_VERSION)
            .header("X-TC-Region", &self.region)
            .header("X-TC-Timestamp", timestamp.to_string())
            .body(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = resp.status();
        let raw = resp.text().await.map_err(ClientError::Transport)?;
        debug!("{} answered {} ({} bytes)", ACTION, status, raw.len());

        if !status.is_success() {
            return Err(ApiError {
                code: "ClientError.HttpStatusCodeError".to_string(),
                message: format!("{}: {}", status, raw.trim()),
                request_id: None,
            }
            .into());
        }

        parse_response(raw)
    }
}

/// Splits a response body into data or an API-level error.
pub fn parse_response(raw: String) -> Result<StatisticData, MetricsError> {
    let envelope: Envelope = serde_json::from_str(&raw).map_err(ClientError::Decode)?;
    let body = envelope.response;

    if let Some(err) = body.error {
        return Err(ApiError {
            code: err.code,
            message: err.message,
            request_id: body.request_id,
        }
        .into());
    }

    Ok(StatisticData {
        data: body.data.unwrap_or_default(),
        request_id: body.request_id,
        raw,
    })
}
