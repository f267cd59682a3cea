use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tke_workload_metrics::cli::Args;
use tke_workload_metrics::{
    client_from_kubeconfig, default_config_path, default_kubeconfig_path, list_deployment_names,
    load_config, parse_time_window, CsvReport, MetricsCollector, MonitorClient, SystemEnvironment,
};

#[tokio::main]
async fn main() {
    let args = Args::parse_normalized();
    init_tracing(args.debug);

    if let Err(err) = run(args).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let env = SystemEnvironment;
    let config_path = args.config.unwrap_or_else(|| default_config_path(&env));
    let kubeconfig_path = args.kubeconfig.unwrap_or_else(|| default_kubeconfig_path(&env));

    let cfg = load_config(&config_path).context("Error loading config")?;
    let window = parse_time_window(&args.start, &args.end).context("Error parsing time window")?;
    info!(
        "namespace = {}, window = {} to {}",
        cfg.namespace,
        window.start_rfc3339(),
        window.end_rfc3339()
    );

    let client = client_from_kubeconfig(&kubeconfig_path)
        .await
        .context("Error building cluster client")?;
    let deployments = list_deployment_names(&client, &cfg.namespace)
        .await
        .context("Error listing deployments")?;
    info!("found {} deployments in {}", deployments.len(), cfg.namespace);

    let mut report =
        CsvReport::create(Path::new("."), &cfg.namespace, &window).context("Error creating report")?;

    let monitor = MonitorClient::new(&cfg).context("Error building monitor client")?;
    let collector = MetricsCollector::new(&monitor, &cfg, &window).with_debug(args.debug);
    collector
        .collect_into(&deployments, &mut report)
        .await
        .context("Error collecting deployment metrics")?;

    info!("wrote {} rows to {}", report.rows(), report.path().display());
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_directives = if debug { "info,tke_workload_metrics=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
