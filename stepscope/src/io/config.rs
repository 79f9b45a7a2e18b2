//! Step reporting configuration stored in `stepscope.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stepscope.toml";

/// Step reporting configuration (TOML).
///
/// Missing fields default to local mode: steps are logged, nothing is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StepsConfig {
    /// Write steps to `report_path`. When false every step only logs its name.
    pub enabled: bool,

    /// JSON-lines report written by the session.
    pub report_path: PathBuf,

    /// Name of the root node opened when the session starts.
    pub launch_name: String,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            report_path: PathBuf::from("stepscope-report.jsonl"),
            launch_name: "tests".to_string(),
        }
    }
}

impl StepsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.launch_name.trim().is_empty() {
            return Err(anyhow!("launch_name must be non-empty"));
        }
        if self.report_path.as_os_str().is_empty() {
            return Err(anyhow!("report_path must be non-empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `StepsConfig::default()`.
pub fn load_config(path: &Path) -> Result<StepsConfig> {
    if !path.exists() {
        let cfg = StepsConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: StepsConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &StepsConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
