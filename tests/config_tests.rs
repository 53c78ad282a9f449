use billing_core::config::{Config, ConfigManager};
use tempfile::TempDir;

#[test]
fn config_manager_persists_changes() {
    let temp = TempDir::new().expect("create temp dir");
    let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();

    let mut config = manager.load().unwrap();
    assert_eq!(config.currency, "BRL");
    config.forecast_horizon_months = 3;
    manager.save(&config).unwrap();

    let reopened = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
    assert_eq!(reopened.load().unwrap().forecast_horizon_months, 3);
}

#[test]
fn invalid_config_is_not_saved() {
    let temp = TempDir::new().expect("create temp dir");
    let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
    let config = Config {
        max_installments: 0,
        ..Config::default()
    };
    assert!(manager.save(&config).is_err());
    assert!(!manager.path().exists());
}
