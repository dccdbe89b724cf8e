//! Configuration structures
//!
//! Loaded by `leadflow-infra::config::loader` from environment variables or a
//! TOML/JSON file. Every section except `database` has defaults, so a minimal
//! file only needs the database path.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_NOTIFY_TIMEOUT_SECS, SERVICE_SEQUENCE_CODE, TELEGRAM_API_BASE};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub numbering: NumberingConfig,
    #[serde(default)]
    pub stages: StageConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub finance: FinanceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Configuration with defaults everywhere except the database location.
    pub fn for_database(path: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig { path: path.into(), ..DatabaseConfig::default() },
            numbering: NumberingConfig::default(),
            stages: StageConfig::default(),
            telegram: TelegramConfig::default(),
            sms: SmsConfig::default(),
            finance: FinanceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// SQLite database location and pool sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "leadflow.db".into(), pool_size: default_pool_size() }
    }
}

/// Service-number counter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingConfig {
    #[serde(default = "default_sequence_code")]
    pub sequence_code: String,
    /// Look up a company-scoped counter before the global one.
    #[serde(default = "default_true")]
    pub scope_by_company: bool,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self { sequence_code: default_sequence_code(), scope_by_company: true }
    }
}

/// Stage detection overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Explicit id of the "new requests" stage; name heuristics apply when
    /// unset.
    #[serde(default)]
    pub new_stage_id: Option<i64>,
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_telegram_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: default_telegram_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TelegramConfig {
    /// Token if configured and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.bot_token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// SMS gateway selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    #[default]
    Disabled,
    Eskiz,
    PlayMobile,
}

/// Customer SMS settings (disabled by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default)]
    pub provider: SmsProvider,
    /// Eskiz account e-mail or Play Mobile login.
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Sender id / originator.
    #[serde(default = "default_sender_id")]
    pub sender_id: String,
    /// Provider base URL override.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_new_request_template")]
    pub new_request_template: String,
    #[serde(default = "default_won_template")]
    pub won_template: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::Disabled,
            login: None,
            password: None,
            sender_id: default_sender_id(),
            api_base: None,
            timeout_secs: default_timeout_secs(),
            new_request_template: default_new_request_template(),
            won_template: default_won_template(),
        }
    }
}

impl SmsConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != SmsProvider::Disabled
    }
}

/// Technician bonus policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceConfig {
    #[serde(default = "default_true")]
    pub bonus_enabled: bool,
    /// Share of the lead's work amount credited to the technician.
    #[serde(default = "default_bonus_percent")]
    pub bonus_percent: f64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self { bonus_enabled: true, bonus_percent: default_bonus_percent() }
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

fn default_sequence_code() -> String {
    SERVICE_SEQUENCE_CODE.to_string()
}

fn default_telegram_base() -> String {
    TELEGRAM_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_NOTIFY_TIMEOUT_SECS
}

fn default_sender_id() -> String {
    "4546".to_string()
}

fn default_new_request_template() -> String {
    "Hurmatli mijoz! Murojaatingiz qabul qilindi. Servis raqami: {service_number}".to_string()
}

fn default_won_template() -> String {
    "Hurmatli mijoz! {service_number} raqamli murojaatingiz bo'yicha ish yakunlandi. Rahmat!"
        .to_string()
}

fn default_bonus_percent() -> f64 {
    100.0
}

fn default_log_level() -> String {
    "info".to_string()
}
