//! Runtime configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_TIME_LIMIT_SECS;

/// Environment variable that overrides the configured time limit.
pub const TIME_LIMIT_ENV: &str = "LEVELCHECK_TIME_LIMIT_SECS";

/// Top-level levelcheck configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelcheckConfig {
    /// Countdown length for timed sessions.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    /// Period of the background ticker in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Submit automatically when a timed session reaches zero.
    #[serde(default)]
    pub auto_submit_on_timeout: bool,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report format used when none is given on the command line.
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}
fn default_tick_interval() -> u64 {
    1000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./levelcheck-results")
}
fn default_format() -> String {
    "json".to_string()
}

impl Default for LevelcheckConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit(),
            tick_interval_ms: default_tick_interval(),
            auto_submit_on_timeout: false,
            output_dir: default_output_dir(),
            default_format: default_format(),
        }
    }
}

impl LevelcheckConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Parse a config from TOML text, without env overrides.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: LevelcheckConfig = toml::from_str(content)?;
        config.resolve_env_refs();
        Ok(config)
    }

    fn resolve_env_refs(&mut self) {
        let output_dir = self.output_dir.to_string_lossy();
        if output_dir.contains("${") {
            self.output_dir = PathBuf::from(resolve_env_vars(&output_dir));
        }
        self.default_format = resolve_env_vars(&self.default_format);
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(TIME_LIMIT_ENV) {
            self.time_limit_secs = value
                .trim()
                .parse()
                .with_context(|| format!("invalid {TIME_LIMIT_ENV}: {value:?}"))?;
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load config from an explicit path, or search the well-known paths:
/// 1. `levelcheck.toml` in the current directory
/// 2. `~/.config/levelcheck/config.toml`
///
/// `LEVELCHECK_TIME_LIMIT_SECS` overrides the time limit.
pub fn load_config_from(path: Option<&Path>) -> Result<LevelcheckConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("levelcheck.toml");
            if local.exists() {
                Some(local)
            } else {
                global_config_path().filter(|p| p.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            LevelcheckConfig::from_toml(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LevelcheckConfig::default(),
    };

    config.apply_env_overrides()?;
    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("levelcheck")
            .join("config.toml")
    })
}
