use crate::constants::{DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::errors::{AuraError, AuraResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the inference backend. Never hard-coded at call sites;
    /// deployments point this wherever the service actually lives.
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "info".to_string(),
        }
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

pub fn initialize_config() -> AuraResult<()> {
    let config_path = get_config_path()?;

    let mut config = if config_path.exists() {
        let config_str = fs::read_to_string(&config_path)
            .map_err(|e| AuraError::config(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&config_str)
            .map_err(|e| AuraError::config(format!("Failed to parse config: {}", e)))?
    } else {
        let config = Config::default();

        fs::create_dir_all(config_path.parent().unwrap())
            .map_err(|e| AuraError::config(format!("Failed to create config directory: {}", e)))?;

        let config_str = serde_json::to_string_pretty(&config)
            .map_err(|e| AuraError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, config_str)
            .map_err(|e| AuraError::config(format!("Failed to write config file: {}", e)))?;

        config
    };

    // Environment wins over the config file
    if let Ok(url) = env::var("AURA_BACKEND_URL") {
        config.backend_url = url;
    }

    validate_config(&config)?;
    *CONFIG.write().unwrap() = config;

    Ok(())
}

fn get_config_path() -> AuraResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| AuraError::config("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join("aura-chat").join("config.json"))
}

pub fn validate_config(config: &Config) -> AuraResult<()> {
    if config.backend_url.is_empty() {
        return Err(AuraError::config("backend_url is required"));
    }

    if !config.backend_url.starts_with("http://") && !config.backend_url.starts_with("https://") {
        return Err(AuraError::config(
            "backend_url must be an http:// or https:// origin",
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(AuraError::config(
            "request_timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}

pub fn get_config() -> Config {
    CONFIG.read().unwrap().clone()
}

pub fn update_config(updated_config: Config) -> AuraResult<()> {
    validate_config(&updated_config)?;

    let config_path = get_config_path()?;
    let config_str = serde_json::to_string_pretty(&updated_config)
        .map_err(|e| AuraError::config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, config_str)
        .map_err(|e| AuraError::config(format!("Failed to write config file: {}", e)))?;

    *CONFIG.write().unwrap() = updated_config;

    Ok(())
}
