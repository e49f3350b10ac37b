//! Scenario files
//!
//! Scenarios are stored as YAML. A scenario can also be named by preset
//! instead of a path, in which case the built-in definition is used.

use std::fs;
use std::path::{Path, PathBuf};

use olg_core::config::{self, ScenarioConfig};

/// Errors while locating, reading or writing scenario files
#[derive(Debug)]
pub enum ScenarioError {
    Io(String),
    Parse(String),
    Serialize(String),
    UnknownPreset(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Io(msg) => write!(f, "IO error: {msg}"),
            ScenarioError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ScenarioError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
            ScenarioError::UnknownPreset(name) => write!(
                f,
                "unknown preset '{name}' (available: {})",
                config::PRESET_NAMES.join(", ")
            ),
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Where a scenario comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioSource {
    File(PathBuf),
    Preset(String),
}

impl ScenarioSource {
    pub fn load(&self) -> Result<ScenarioConfig, ScenarioError> {
        match self {
            ScenarioSource::File(path) => load_scenario(path),
            ScenarioSource::Preset(name) => {
                config::preset(name).ok_or_else(|| ScenarioError::UnknownPreset(name.clone()))
            }
        }
    }
}

pub fn from_yaml(yaml: &str) -> Result<ScenarioConfig, ScenarioError> {
    serde_saphyr::from_str(yaml).map_err(|e| ScenarioError::Parse(e.to_string()))
}

pub fn to_yaml(scenario: &ScenarioConfig) -> Result<String, ScenarioError> {
    serde_saphyr::to_string(scenario).map_err(|e| ScenarioError::Serialize(e.to_string()))
}

pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, ScenarioError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ScenarioError::Io(format!("Failed to read {}: {e}", path.display())))?;
    let mut scenario = from_yaml(&content)?;
    if scenario.name.is_empty()
        && let Some(stem) = path.file_stem()
    {
        scenario.name = stem.to_string_lossy().into_owned();
    }
    tracing::debug!(path = %path.display(), name = %scenario.name, "loaded scenario");
    Ok(scenario)
}

/// Sanitize a scenario name for use as a filename
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write `scenario` to `{dir}/{name}.yaml`, returning the path written
pub fn save_scenario(dir: &Path, scenario: &ScenarioConfig) -> Result<PathBuf, ScenarioError> {
    fs::create_dir_all(dir).map_err(|e| {
        ScenarioError::Io(format!("Failed to create {}: {e}", dir.display()))
    })?;
    let path = dir.join(format!("{}.yaml", sanitize_filename(&scenario.name)));
    let yaml = to_yaml(scenario)?;
    fs::write(&path, yaml)
        .map_err(|e| ScenarioError::Io(format!("Failed to write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "wrote scenario");
    Ok(path)
}
