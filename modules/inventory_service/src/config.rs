//! Configuration for inventory service module

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `INVENTORY_MAX_IMPORT_ROWS=200`
const ENV_PREFIX: &str = "INVENTORY_";

/// Inventory service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Largest batch accepted by a single import call
    #[serde(default = "default_max_import_rows")]
    pub max_import_rows: usize,

    /// Entries returned by an audit log listing without an explicit limit
    #[serde(default = "default_audit_log_page_size")]
    pub audit_log_page_size: u64,

    /// Dispatch post-commit notifications to the sink
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_import_rows: default_max_import_rows(),
            audit_log_page_size: default_audit_log_page_size(),
            notifications_enabled: true,
        }
    }
}

impl Config {
    /// Layer defaults, an optional YAML file and `INVENTORY_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(config)
    }
}

fn default_max_import_rows() -> usize {
    5000
}

fn default_audit_log_page_size() -> u64 {
    50
}

fn default_true() -> bool {
    true
}
