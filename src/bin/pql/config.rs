use super::{ColorMode, OutputFormat};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings read from `cli.toml`. Every key is optional; flags win.
#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    format: Option<OutputFormat>,
    color: Option<ColorMode>,
    log_filter: Option<String>,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            _ => RawConfig::default(),
        };
        let format = match data.format.as_deref() {
            Some(value) => Some(OutputFormat::from_str(value, true).map_err(|_| {
                ConfigError::InvalidValue {
                    key: "format",
                    value: value.to_string(),
                }
            })?),
            None => None,
        };
        let color = match data.color.as_deref() {
            Some(value) => Some(ColorMode::from_str(value, true).map_err(|_| {
                ConfigError::InvalidValue {
                    key: "color",
                    value: value.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            path,
            format,
            color,
            log_filter: data.log_filter,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    pub fn color(&self) -> Option<ColorMode> {
        self.color
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.log_filter.as_deref()
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    log_filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config value '{value}' is invalid for '{key}'")]
    InvalidValue { key: &'static str, value: String },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("pilosa-pql").join("cli.toml"))
}
