//! Out-of-process lookup scripts (ticket list, asset search).
//!
//! Each call runs one script with the configured interpreter and reads a
//! single JSON document from its stdout.

use crate::config::Config;
use crate::error::{bridge_error, Error};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error as ThisError;
use tokio::process::Command;
use tracing::{debug, error};

/// Script that looks up an asset by serial number
pub const ASSET_SEARCH_SCRIPT: &str = "search_bridge.py";

/// Script that lists the team's open tickets
pub const TICKETS_SCRIPT: &str = "tickets_bridge.py";

/// Ways a bridge call can fail
#[derive(Debug, ThisError)]
pub enum BridgeError {
    #[error("failed to start {script}: {source}")]
    Spawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{script} timed out after {seconds}s")]
    Timeout { script: String, seconds: u64 },

    #[error("{script} exited with {code:?}")]
    Exit { script: String, code: Option<i32> },

    #[error("{script} printed invalid JSON: {reason}")]
    InvalidOutput { script: String, reason: String },
}

impl From<BridgeError> for Error {
    fn from(err: BridgeError) -> Self {
        bridge_error(&err.to_string())
    }
}

/// Runner for the lookup scripts
#[derive(Debug, Clone)]
pub struct LookupBridge {
    interpreter: PathBuf,
    script_dir: PathBuf,
    timeout: Duration,
}

impl LookupBridge {
    pub fn new(interpreter: impl Into<PathBuf>, script_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            script_dir: script_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.python_bin,
            &config.bridge_dir,
            Duration::from_secs(config.bridge_timeout_secs),
        )
    }

    /// Look up an asset by serial number
    pub async fn search_asset(&self, serial: &str) -> Result<Value, BridgeError> {
        self.run_script(ASSET_SEARCH_SCRIPT, &[serial]).await
    }

    /// Fetch the open ticket list
    pub async fn list_tickets(&self) -> Result<Value, BridgeError> {
        self.run_script(TICKETS_SCRIPT, &[]).await
    }

    /// Run a script and parse its stdout as JSON
    pub async fn run_script(&self, script: &str, args: &[&str]) -> Result<Value, BridgeError> {
        let script_path = self.script_dir.join(script);
        debug!("Running bridge script {}", script_path.display());

        let child = Command::new(&self.interpreter)
            .arg(&script_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                script: script.to_string(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| BridgeError::Timeout {
                script: script.to_string(),
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|source| BridgeError::Spawn {
                script: script.to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            error!("[{} stderr]: {}", script, line);
        }

        if !output.status.success() {
            return Err(BridgeError::Exit {
                script: script.to_string(),
                code: output.status.code(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| BridgeError::InvalidOutput {
            script: script.to_string(),
            reason: e.to_string(),
        })
    }
}
