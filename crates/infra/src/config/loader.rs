//! Configuration loader
//!
//! ## Loading Strategy
//! 1. When `LEADFLOW_DB_PATH` is set, configuration comes from the
//!    environment alone (defaults for everything not set)
//! 2. Otherwise the first config file found by [`probe_config_paths`] is
//!    parsed, then the optional `LEADFLOW_*` variables override it
//! 3. JSON and TOML are supported, detected by extension
//!
//! ## Environment Variables
//! - `LEADFLOW_DB_PATH`, `LEADFLOW_DB_POOL_SIZE`
//! - `LEADFLOW_SEQUENCE_CODE`, `LEADFLOW_NEW_STAGE_ID`
//! - `LEADFLOW_TELEGRAM_BOT_TOKEN`, `LEADFLOW_TELEGRAM_API_BASE`
//! - `LEADFLOW_SMS_PROVIDER` (`disabled`, `eskiz`, `playmobile`),
//!   `LEADFLOW_SMS_LOGIN`, `LEADFLOW_SMS_PASSWORD`, `LEADFLOW_SMS_SENDER`,
//!   `LEADFLOW_SMS_API_BASE`
//! - `LEADFLOW_BONUS_ENABLED`, `LEADFLOW_BONUS_PERCENT`
//! - `LEADFLOW_LOG_LEVEL`, `LEADFLOW_LOG_JSON`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use leadflow_domain::{Config, LeadflowError, Result, SmsProvider};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["leadflow.toml", "leadflow.json", "config.toml", "config.json"];

/// Load configuration from the environment or the first config file found.
pub fn load() -> Result<Config> {
    if std::env::var_os("LEADFLOW_DB_PATH").is_some() {
        let config = load_from_env()?;
        tracing::info!("configuration loaded from environment variables");
        return Ok(config);
    }
    let mut config = load_from_file(None)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Build configuration from `LEADFLOW_*` variables.
///
/// # Errors
/// `Config` when `LEADFLOW_DB_PATH` is missing or a value does not parse.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("LEADFLOW_DB_PATH")?;
    let mut config = Config::for_database(db_path);
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from `path`, or from the first probed location when
/// `path` is `None`.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LeadflowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LeadflowError::Config(
                "No config file found and LEADFLOW_DB_PATH is not set".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LeadflowError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LeadflowError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LeadflowError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(LeadflowError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the working directory, its parent, or next
/// to the executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Apply the optional `LEADFLOW_*` variables on top of `config`.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(path) = env_opt("LEADFLOW_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = env_parse::<u32>("LEADFLOW_DB_POOL_SIZE")? {
        config.database.pool_size = size;
    }
    if let Some(code) = env_opt("LEADFLOW_SEQUENCE_CODE") {
        config.numbering.sequence_code = code;
    }
    if let Some(stage_id) = env_parse::<i64>("LEADFLOW_NEW_STAGE_ID")? {
        config.stages.new_stage_id = Some(stage_id);
    }

    if let Some(token) = env_opt("LEADFLOW_TELEGRAM_BOT_TOKEN") {
        config.telegram.bot_token = Some(token);
    }
    if let Some(base) = env_opt("LEADFLOW_TELEGRAM_API_BASE") {
        config.telegram.api_base = base;
    }

    if let Some(provider) = env_opt("LEADFLOW_SMS_PROVIDER") {
        config.sms.provider = parse_provider(&provider)?;
    }
    if let Some(login) = env_opt("LEADFLOW_SMS_LOGIN") {
        config.sms.login = Some(login);
    }
    if let Some(password) = env_opt("LEADFLOW_SMS_PASSWORD") {
        config.sms.password = Some(password);
    }
    if let Some(sender) = env_opt("LEADFLOW_SMS_SENDER") {
        config.sms.sender_id = sender;
    }
    if let Some(base) = env_opt("LEADFLOW_SMS_API_BASE") {
        config.sms.api_base = Some(base);
    }

    config.finance.bonus_enabled = env_bool("LEADFLOW_BONUS_ENABLED", config.finance.bonus_enabled);
    if let Some(percent) = env_parse::<f64>("LEADFLOW_BONUS_PERCENT")? {
        config.finance.bonus_percent = percent;
    }

    if let Some(level) = env_opt("LEADFLOW_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("LEADFLOW_LOG_JSON", config.logging.json);
    Ok(())
}

fn parse_provider(raw: &str) -> Result<SmsProvider> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "disabled" | "none" => Ok(SmsProvider::Disabled),
        "eskiz" => Ok(SmsProvider::Eskiz),
        "playmobile" | "play_mobile" => Ok(SmsProvider::PlayMobile),
        other => Err(LeadflowError::Config(format!("Unknown SMS provider: {other}"))),
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| LeadflowError::Config(format!("Missing required environment variable: {key}")))
}

/// Set and non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| LeadflowError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
