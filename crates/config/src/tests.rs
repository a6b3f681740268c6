use crate::{ApiConfig, AppConfig, ConfigError, StoreBackend};
use figment::{
    Figment,
    providers::{Format, Toml},
};
use secrecy::{ExposeSecret, Secret};

fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
    AppConfig::from_figment(Figment::from(Toml::string(toml)))
}

#[test]
fn test_defaults_applied() {
    let config = from_toml(r#"app_name = "tray-dispatch""#).unwrap();
    assert_eq!(config.app_env, "development");
    assert!(config.is_development());
    assert_eq!(config.telemetry.log_level, "info");
    assert_eq!(config.inventory.overdue_threshold_days, 10);
    assert_eq!(config.inventory.base_inventory.hq, 1200);
    assert_eq!(config.inventory.base_inventory.nq, 1800);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert!(config.store.seed_path.is_none());
}

#[test]
fn test_memory_seed_path() {
    let config = from_toml(
        r#"
        app_name = "tray-dispatch"
        [store]
        backend = "memory"
        seed_path = "config/seed.json"
        "#,
    )
    .unwrap();
    assert_eq!(config.store.seed_path.as_deref(), Some("config/seed.json"));
}

#[test]
fn test_inventory_overrides() {
    let config = from_toml(
        r#"
        app_name = "tray-dispatch"
        app_env = "production"

        [inventory]
        overdue_threshold_days = 14

        [inventory.base_inventory]
        hq = 100
        nq = 200
        "#,
    )
    .unwrap();
    assert!(config.is_production());
    assert_eq!(config.inventory.overdue_threshold_days, 14);
    assert_eq!(config.inventory.base_inventory.hq, 100);
    assert_eq!(config.inventory.base_inventory.nq, 200);
}

#[test]
fn test_api_backend_requires_api_section() {
    let err = from_toml(
        r#"
        app_name = "tray-dispatch"
        [store]
        backend = "api"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_api_backend_config() {
    let config = from_toml(
        r#"
        app_name = "tray-dispatch"
        [store]
        backend = "api"
        [store.api]
        base_url = "http://localhost:8000/api/v1/"
        token = "secret-token"
        "#,
    )
    .unwrap();
    let api = config.store.api.unwrap();
    assert_eq!(api.base_url.as_str(), "http://localhost:8000/api/v1/");
    assert_eq!(api.timeout_secs, 30);
    assert_eq!(api.token.unwrap().expose_secret(), "secret-token");
}

#[test]
fn test_negative_threshold_rejected() {
    let err = from_toml(
        r#"
        app_name = "tray-dispatch"
        [inventory]
        overdue_threshold_days = -1
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_secret_redaction() {
    let secret = Secret::new("my_secret_token".to_string());
    let debug_output = format!("{:?}", secret);
    assert!(debug_output.contains("Secret([REDACTED"));
    assert!(!debug_output.contains("my_secret_token"));
}

#[test]
fn test_config_struct_redaction() {
    let config = ApiConfig {
        base_url: "https://lab.example.com/api/v1/".parse().unwrap(),
        token: Some(Secret::new("bearer-pass".to_string())),
        timeout_secs: 30,
    };
    let debug_output = format!("{:?}", config);
    assert!(!debug_output.contains("bearer-pass"));
    assert!(debug_output.contains("Secret([REDACTED"));
}
