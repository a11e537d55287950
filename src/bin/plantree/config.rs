use super::{OutputFormat, ThemeArg};
use clap::ValueEnum;
use plantree::AnalyserOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    data: RawConfig,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let data = if let Some(config_path) = path.as_ref() {
            if config_path.exists() {
                read_file(config_path)?
            } else {
                RawConfig::default()
            }
        } else {
            RawConfig::default()
        };
        let config = Self { path, data };
        config.format()?;
        config.theme()?;
        Ok(config)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn analyser_options(&self) -> AnalyserOptions {
        self.data.analyser.clone()
    }

    pub fn format(&self) -> Result<Option<OutputFormat>, ConfigError> {
        parse_enum("output.format", self.data.output.format.as_deref())
    }

    pub fn theme(&self) -> Result<Option<ThemeArg>, ConfigError> {
        parse_enum("output.theme", self.data.output.theme.as_deref())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "analyser.explain_prefix" => self.data.analyser.explain_prefix = value.to_string(),
            "analyser.group_column" => self.data.analyser.group_column = value.to_string(),
            "output.format" => {
                parse_enum::<OutputFormat>(key, Some(value))?;
                self.data.output.format = Some(value.to_string());
            }
            "output.theme" => {
                parse_enum::<ThemeArg>(key, Some(value))?;
                self.data.output.theme = Some(value.to_string());
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "analyser.explain_prefix",
                format!("{:?}", self.data.analyser.explain_prefix),
            ),
            (
                "analyser.group_column",
                self.data.analyser.group_column.clone(),
            ),
            (
                "output.format",
                self.data.output.format.clone().unwrap_or_else(|| "text".into()),
            ),
            (
                "output.theme",
                self.data.output.theme.clone().unwrap_or_else(|| "auto".into()),
            ),
        ]
    }

    pub fn persist(&self) -> Result<PathBuf, ConfigError> {
        let target = if let Some(path) = &self.path {
            path.clone()
        } else if let Some(default) = default_config_path() {
            default
        } else {
            return Err(ConfigError::NoConfigPath);
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let serialized = toml::to_string_pretty(&self.data)
            .map_err(|source| ConfigError::Serialize { source })?;
        fs::write(&target, serialized).map_err(|source| ConfigError::Write {
            path: target.clone(),
            source,
        })?;
        Ok(target)
    }
}

fn parse_enum<T: ValueEnum>(key: &str, value: Option<&str>) -> Result<Option<T>, ConfigError> {
    match value {
        Some(value) => T::from_str(value, true)
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        None => Ok(None),
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

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawConfig {
    #[serde(default)]
    analyser: AnalyserOptions,
    #[serde(default)]
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct OutputSection {
    format: Option<String>,
    theme: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {source}")]
    Serialize { source: toml::ser::Error },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config value '{value}' is invalid for {key}")]
    InvalidValue { key: String, value: String },
    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },
    #[error("no config directory found; pass --config or set PLANTREE_CONFIG")]
    NoConfigPath,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("plantree").join("config.toml"))
}
