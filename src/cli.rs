use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub const DEFAULT_START: &str = "2024-07-18T00:00:00+08:00";
pub const DEFAULT_END: &str = "2024-07-18T13:00:00+08:00";

const LONG_FLAGS: &[&str] = &["kubeconfig", "config", "start", "end", "debug"];

#[derive(Parser, Debug)]
#[command(name = "tke-workload-metrics")]
#[command(about = "Export peak CPU/memory usage of a namespace's Deployments to CSV")]
pub struct Args {
    /// Path to the kubeconfig file [default: $HOME/.kube/config]
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Path to the config file [default: $HOME/.metrics/config.yaml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start time for monitoring in RFC3339 format
    #[arg(long, default_value = DEFAULT_START)]
    pub start: String,

    /// End time for monitoring in RFC3339 format
    #[arg(long, default_value = DEFAULT_END)]
    pub end: String,

    /// Show raw metrics, enable debug logging
    #[arg(
        long,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        require_equals = true,
        action = ArgAction::Set
    )]
    pub debug: bool,
}

/// Rewrites single-dash long flags (`-start`, `-start=...`) to the double-dash
/// form clap expects.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            let rewritten = arg.to_str().and_then(|s| {
                let flag = s.strip_prefix('-').filter(|rest| !rest.starts_with('-'))?;
                let name = flag.split('=').next().unwrap_or(flag);
                LONG_FLAGS.contains(&name).then(|| OsString::from(format!("-{}", s)))
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}

impl Args {
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}
