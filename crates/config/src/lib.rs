//! shop-config - 配置加载库
//!
//! 加载顺序：`{dir}/default.toml` → `{dir}/{APP_ENV}.toml` → `SHOP_` 前缀的环境变量
//! （嵌套层级用 `__` 分隔，如 `SHOP_WEBHOOK__STRIPE_SECRET`）。

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 未配置时占位用的 webhook 密钥
const PLACEHOLDER_WEBHOOK_SECRET: &str = "whsec_dummy";

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 输出 JSON 日志（生产环境总是 JSON）
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// 存储配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret")]
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 自定义模板目录，缺省使用内置模板
    pub template_dir: Option<String>,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_timeout_secs() -> u64 {
    30
}

/// 对外链接配置
#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    /// 邮件中链接使用的站点根地址
    pub app_base_url: String,
}

/// 支付 webhook 配置
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "empty_secret")]
    pub stripe_secret: Secret<String>,
    /// 签名时间戳允许的偏差（秒）
    #[serde(default = "default_tolerance_secs")]
    pub tolerance_secs: i64,
    /// 已处理事件记录的保留时长（小时）
    #[serde(default = "default_processed_event_ttl_hours")]
    pub processed_event_ttl_hours: i64,
}

fn default_tolerance_secs() -> i64 {
    300
}

fn default_processed_event_ttl_hours() -> i64 {
    24
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            stripe_secret: empty_secret(),
            tolerance_secs: default_tolerance_secs(),
            processed_event_ttl_hours: default_processed_event_ttl_hours(),
        }
    }
}

impl WebhookConfig {
    /// 密钥是否已真正配置
    pub fn is_configured(&self) -> bool {
        let secret = self.stripe_secret.expose_secret();
        !secret.trim().is_empty() && secret != PLACEHOLDER_WEBHOOK_SECRET
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub database: Option<DatabaseConfig>,
    pub email: EmailConfig,
    pub links: LinksConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

fn default_app_env() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("SHOP_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// 校验跨字段约束
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.is_none() {
            return Err(ConfigError::Invalid(
                "storage.backend = \"postgres\" requires a [database] section".to_string(),
            ));
        }

        url::Url::parse(&self.links.app_base_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "links.app_base_url is not a valid URL ({}): {}",
                self.links.app_base_url, e
            ))
        })?;

        if self.webhook.tolerance_secs <= 0 {
            return Err(ConfigError::Invalid(
                "webhook.tolerance_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// 站点根地址（去掉末尾斜杠）
    pub fn base_url(&self) -> &str {
        self.links.app_base_url.trim_end_matches('/')
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
