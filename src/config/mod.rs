use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::errors::{BillingError, Result};

const HOME_ENV: &str = "BILLING_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".billing_core";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub currency: String,
    pub locale: String,
    #[serde(default = "Config::default_horizon")]
    pub forecast_horizon_months: u32,
    #[serde(default = "Config::default_max_installments")]
    pub max_installments: u32,
}

impl Config {
    fn default_horizon() -> u32 {
        12
    }

    fn default_max_installments() -> u32 {
        48
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_installments < 1 {
            return Err(BillingError::InvalidArgument(
                "max_installments must be at least 1".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(BillingError::InvalidArgument("currency must be set".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "BRL".into(),
            locale: "pt-BR".into(),
            forecast_horizon_months: Self::default_horizon(),
            max_installments: Self::default_max_installments(),
        }
    }
}

/// Loads and stores [`Config`] as JSON under the application data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses `$BILLING_CORE_HOME`, falling back to `~/.billing_core`.
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Returns the stored configuration, or defaults when nothing was saved yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "saved config");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().join("nested")).unwrap();
        let config = Config {
            currency: "USD".into(),
            locale: "en-US".into(),
            forecast_horizon_months: 6,
            max_installments: 12,
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!tmp_path(manager.path()).exists());
    }

    #[test]
    fn missing_optional_fields_fall_back() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"currency":"EUR","locale":"pt-PT"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.forecast_horizon_months, 12);
        assert_eq!(config.max_installments, 48);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{not json").unwrap();
        assert!(matches!(manager.load(), Err(BillingError::Storage(_))));
    }
}
