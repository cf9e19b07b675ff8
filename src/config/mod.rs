use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::entitlement::{Entitlement, Tier, FREE_MASK_LIMIT, PREMIUM_MASK_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "masknote";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub free_mask_limit: Option<usize>,
    #[serde(default)]
    pub premium_mask_limit: Option<usize>,
}

impl AppConfig {
    pub fn entitlement(&self) -> Entitlement {
        Entitlement::with_limits(
            self.tier,
            self.free_mask_limit.unwrap_or(FREE_MASK_LIMIT),
            self.premium_mask_limit.unwrap_or(PREMIUM_MASK_LIMIT),
        )
    }

    /// Explicit `data_dir`, else the XDG data location.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigPathError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let (xdg_data_home, home) = data_env_dirs();
        app_data_dir(APP_DIR, xdg_data_home.as_deref(), home.as_deref())
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn data_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = xdg_root(xdg_config_home, home, &[".config"])?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

pub fn app_data_dir(
    app_dir: &str,
    xdg_data_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = xdg_root(xdg_data_home, home, &[".local", "share"])?;
    path.push(app_dir);
    Ok(path)
}

fn xdg_root(
    xdg_home: Option<&Path>,
    home: Option<&Path>,
    fallback: &[&str],
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let mut root = home
        .ok_or(ConfigPathError::MissingHomeDirectory)?
        .to_path_buf();
    root.extend(fallback);
    Ok(root)
}
