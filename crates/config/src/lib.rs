//! tray-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// 基础托盘库存（站点拥有的 HQ/NQ 托盘总数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BaseInventoryConfig {
    #[serde(default = "default_base_hq")]
    pub hq: u32,
    #[serde(default = "default_base_nq")]
    pub nq: u32,
}

fn default_base_hq() -> u32 {
    1200
}

fn default_base_nq() -> u32 {
    1800
}

impl Default for BaseInventoryConfig {
    fn default() -> Self {
        Self {
            hq: default_base_hq(),
            nq: default_base_nq(),
        }
    }
}

/// 库存与逾期策略配置
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_overdue_threshold_days")]
    pub overdue_threshold_days: i64,
    #[serde(default)]
    pub base_inventory: BaseInventoryConfig,
}

fn default_overdue_threshold_days() -> i64 {
    10
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            overdue_threshold_days: default_overdue_threshold_days(),
            base_inventory: BaseInventoryConfig::default(),
        }
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// 进程内存储
    #[default]
    Memory,
    /// 远端 CRUD API
    Api,
}

/// 远端 API 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: Url,
    pub token: Option<Secret<String>>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// 存储配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub api: Option<ApiConfig>,
    /// 内存后端的初始数据（远端列表格式的 JSON 数组）
    pub seed_path: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 环境变量使用 `TRAY_` 前缀，`__` 分隔层级，例如
    /// `TRAY_INVENTORY__OVERDUE_THRESHOLD_DAYS=14`。
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("TRAY_").split("__"));

        Self::from_figment(figment)
    }

    /// 从任意 figment 提供者加载并校验
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory.overdue_threshold_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "inventory.overdue_threshold_days must be >= 0, got {}",
                self.inventory.overdue_threshold_days
            )));
        }
        if self.store.backend == StoreBackend::Api && self.store.api.is_none() {
            return Err(ConfigError::Invalid(
                "store.api is required when store.backend = \"api\"".to_string(),
            ));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests;
