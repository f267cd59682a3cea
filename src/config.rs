use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::Config;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

fn home_dir<E: EnvironmentProvider>(env: &E) -> PathBuf {
    // An unset HOME leaves the default relative to the working directory.
    PathBuf::from(env.get_var("HOME").unwrap_or_default())
}

pub fn default_kubeconfig_path<E: EnvironmentProvider>(env: &E) -> PathBuf {
    home_dir(env).join(".kube").join("config")
}

pub fn default_config_path<E: EnvironmentProvider>(env: &E) -> PathBuf {
    home_dir(env).join(".metrics").join("config.yaml")
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&data)
}

pub fn parse_config(data: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(data)?;
    config.validate()?;
    Ok(config)
}
