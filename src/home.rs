//! Home-directory configuration: initialization markers, run-control
//! settings, and the default daemon configuration.
//!
//! The daemon configuration is consumed here, never interpreted beyond the
//! concurrency fields the submission adapter reports.
use crate::util::{read_json, write_json_atomic};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "GENOFLOW_HOME";
pub const RC_FILE: &str = ".genoflow_rc";
pub const DAEMON_CONFIG_FILE: &str = ".genoflow_daemon.json";

/// Current schema version for `.genoflow_rc`.
pub const RC_SCHEMA_VERSION: u32 = 1;

/// Run-control settings stored in `.genoflow_rc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunControl {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon_bin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncbi_api_key: Option<String>,
}

/// Daemon configuration fields this crate reads; everything else is the
/// daemon's business and is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaemonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxjobs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppn: Option<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,
}

/// Defaults written by `genoflow init`.
pub fn default_daemon_config() -> DaemonConfig {
    DaemonConfig {
        maxjobs: Some(6),
        ppn: Some(2),
        kind: Some("bash".to_string()),
        latency: Some(30),
    }
}

pub fn default_run_control() -> RunControl {
    RunControl {
        schema_version: RC_SCHEMA_VERSION,
        daemon_bin: None,
        ncbi_api_key: None,
    }
}

pub fn load_daemon_config(path: &Path) -> Result<DaemonConfig> {
    read_json(path)
}

/// Directory holding the markers; `GENOFLOW_HOME` wins over the user home.
#[derive(Debug, Clone)]
pub struct HomeDir {
    root: PathBuf,
}

impl HomeDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn from_env() -> Result<Self> {
        let root = env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow!("cannot determine home directory (set {HOME_ENV})"))?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rc_path(&self) -> PathBuf {
        self.root.join(RC_FILE)
    }

    pub fn daemon_config_path(&self) -> PathBuf {
        self.root.join(DAEMON_CONFIG_FILE)
    }

    /// Initialized iff both the run-control marker and the default daemon
    /// configuration exist.
    pub fn is_initialized(&self) -> bool {
        self.rc_path().is_file() && self.daemon_config_path().is_file()
    }

    /// Load run-control settings, falling back to defaults when absent.
    pub fn load_run_control(&self) -> Result<RunControl> {
        let path = self.rc_path();
        if !path.is_file() {
            return Ok(default_run_control());
        }
        read_json(&path)
    }

    pub fn write_run_control(&self, settings: &RunControl) -> Result<()> {
        write_json_atomic(&self.rc_path(), settings)
    }

    pub fn write_daemon_config(&self, config: &DaemonConfig) -> Result<()> {
        write_json_atomic(&self.daemon_config_path(), config)
    }
}
