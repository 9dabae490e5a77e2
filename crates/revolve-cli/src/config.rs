//! Driver settings – read from a TOML file, then `REVOLVE_*` overrides.

use std::fs;
use std::path::{Path, PathBuf};

use revolve_types::RevolveError;
use serde::{Deserialize, Serialize};

/// Settings of one headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSettings {
    /// Simulated seconds advanced per host tick.
    #[serde(default = "default_step_size")]
    pub step_size: f64,

    /// Simulated seconds to run for.
    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Name of the simulated robot model.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Robot configuration document (JSON, or TOML by extension).
    #[serde(default = "default_robot_config")]
    pub robot_config: PathBuf,

    /// Simulated seconds between battery level queries; 0 disables them.
    #[serde(default = "default_battery_query_interval")]
    pub battery_query_interval: f64,

    /// Symmetric position limit given to every joint of the stub model.
    #[serde(default = "default_joint_limit")]
    pub joint_limit: f64,
}

fn default_step_size() -> f64 {
    0.001
}
fn default_duration() -> f64 {
    10.0
}
fn default_model_name() -> String {
    "spider".to_string()
}
fn default_robot_config() -> PathBuf {
    PathBuf::from("robot.json")
}
fn default_battery_query_interval() -> f64 {
    1.0
}
fn default_joint_limit() -> f64 {
    1.0
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            step_size: default_step_size(),
            duration: default_duration(),
            model_name: default_model_name(),
            robot_config: default_robot_config(),
            battery_query_interval: default_battery_query_interval(),
            joint_limit: default_joint_limit(),
        }
    }
}

/// Load settings from `path`. Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<SimSettings>, RevolveError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let mut settings: SimSettings = toml::from_str(&raw).map_err(|e| {
        RevolveError::Serialization(format!("settings {}: {e}", path.display()))
    })?;
    apply_env_overrides(&mut settings);
    Ok(Some(settings))
}

/// Apply `REVOLVE_*` environment variable overrides to `settings`.
///
/// | Variable | Field |
/// |---|---|
/// | `REVOLVE_STEP_SIZE` | `step_size` |
/// | `REVOLVE_DURATION` | `duration` |
/// | `REVOLVE_MODEL_NAME` | `model_name` |
///
/// Unparsable or non-positive numbers are ignored.
pub fn apply_env_overrides(settings: &mut SimSettings) {
    if let Some(step) = positive_env("REVOLVE_STEP_SIZE") {
        settings.step_size = step;
    }
    if let Some(duration) = positive_env("REVOLVE_DURATION") {
        settings.duration = duration;
    }
    if let Ok(name) = std::env::var("REVOLVE_MODEL_NAME")
        && !name.is_empty()
    {
        settings.model_name = name;
    }
}

fn positive_env(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| *v > 0.0)
}

/// Write `settings` to `path` as pretty TOML.
pub fn save_to(settings: &SimSettings, path: &Path) -> Result<(), RevolveError> {
    let raw = toml::to_string_pretty(settings)
        .map_err(|e| RevolveError::Serialization(format!("settings: {e}")))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, raw)?;
    Ok(())
}
