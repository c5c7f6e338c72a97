use crate::naming::DEFAULT_TIME_STAMP;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults for options not given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub prefix: String,
    pub postfix: String,
    pub time_stamp: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            postfix: String::new(),
            time_stamp: DEFAULT_TIME_STAMP.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("", "", "mrename")
        .context("cannot determine the configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&app_paths()?.config_path)
}

pub fn save_config(config: &AppConfig) -> Result<PathBuf> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "cannot create configuration directory: {}",
            paths.config_dir.display()
        )
    })?;
    save_config_to(&paths.config_path, config)?;
    Ok(paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration file: {}", path.display()))?;
    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("cannot parse configuration file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let body = toml::to_string_pretty(config).context("cannot serialize configuration")?;
    fs::write(path, body)
        .with_context(|| format!("cannot write configuration file: {}", path.display()))?;
    Ok(())
}
