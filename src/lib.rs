// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod kubernetes;
pub mod monitor;
pub mod collector;
pub mod report;
pub mod cli;

// Re-export commonly used items
pub use types::*;
pub use error::{ApiError, ClientError, ClusterError, ConfigError, MetricsError, ReportError, TimeParseError, WindowBound};
pub use config::{load_config, parse_config, default_config_path, default_kubeconfig_path, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_time_window, compact_timestamp, max_point_value, reduce_metrics};
pub use kubernetes::{client_from_kubeconfig, list_deployment_names};
pub use monitor::{MonitorClient, StatisticDataRequest};
pub use collector::{CollectError, MetricsCollector};
pub use report::{CsvReport, report_file_name};
