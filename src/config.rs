use crate::model::{DeviceId, Settings};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "melora";
const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "history.json";
const LOG_FILE: &str = "melora.log";
const FALLBACK_DEVICE_NAME: &str = "unknown-device";

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("MELORA_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn history_path() -> Result<PathBuf> {
    Ok(config_root()?.join(HISTORY_FILE))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_root()?.join(LOG_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    ensure_config_dir()?;
    let path = settings_path()?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Picks the device key in order: explicit override, configured name and
/// build, then host name and crate version.
pub fn resolve_device_id(settings: &Settings, override_id: Option<&str>) -> DeviceId {
    if let Some(raw) = override_id.filter(|raw| !raw.trim().is_empty()) {
        return DeviceId::new(raw);
    }

    let device_name = settings
        .device_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(host_name)
        .unwrap_or_else(|| FALLBACK_DEVICE_NAME.to_string());
    let build_id = settings
        .build_id
        .clone()
        .filter(|build| !build.trim().is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    DeviceId::from_parts(&device_name, &build_id)
}

fn host_name() -> Option<String> {
    env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .ok()
        .filter(|name| !name.trim().is_empty())
}
