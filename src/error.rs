//! Error types for each stage of an export run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file")]
    Parse(#[from] serde_yaml::Error),

    #[error("{field} is required")]
    MissingField { field: &'static str },
}

/// Which end of the time window failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBound {
    Start,
    End,
}

impl fmt::Display for WindowBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowBound::Start => f.write_str("start"),
            WindowBound::End => f.write_str("end"),
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid {bound} time {input:?}")]
pub struct TimeParseError {
    pub bound: WindowBound,
    pub input: String,
    #[source]
    pub source: chrono::ParseError,
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("loading kubeconfig {}", .path.display())]
    Kubeconfig {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    #[error("connecting to cluster")]
    Connect(#[source] kube::Error),

    #[error("listing deployments in namespace {namespace}")]
    List {
        namespace: String,
        #[source]
        source: kube::Error,
    },
}

/// An error answered by the monitoring API itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[TencentCloudSDKError] Code={code}, Message={message}, RequestId={}", .request_id.as_deref().unwrap_or(""))]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// Failures on our side of the wire: building, sending, or decoding a call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid monitor endpoint {endpoint:?}: {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("building HTTP client")]
    Build(#[source] reqwest::Error),

    #[error("encoding request")]
    Encode(#[source] serde_json::Error),

    #[error("sending request")]
    Transport(#[source] reqwest::Error),

    #[error("decoding response")]
    Decode(#[source] serde_json::Error),
}

/// Outcome of a metrics call that did not succeed.
///
/// `Api` is recoverable per deployment; `Client` aborts the run.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("creating report file {}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing report file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
