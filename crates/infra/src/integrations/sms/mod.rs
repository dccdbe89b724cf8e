//! SMS gateway adapters and provider selection

pub mod eskiz;
pub mod playmobile;

use std::sync::Arc;

use leadflow_core::SmsGateway;
use leadflow_domain::{Result as DomainResult, SmsConfig, SmsProvider};
use tracing::warn;

pub use eskiz::EskizSmsClient;
pub use playmobile::PlayMobileSmsClient;

use crate::http::{normalize_base_url, HttpClient};

/// Gateway for the configured provider.
///
/// `None` when SMS is disabled or the provider credentials are incomplete;
/// customer SMS is optional and never blocks startup.
pub fn build_sms_gateway(config: &SmsConfig) -> DomainResult<Option<Arc<dyn SmsGateway>>> {
    if !config.is_enabled() {
        return Ok(None);
    }
    let credentials = config
        .login
        .as_deref()
        .zip(config.password.as_deref())
        .filter(|(login, password)| !login.trim().is_empty() && !password.is_empty());
    let Some((login, password)) = credentials else {
        warn!(provider = ?config.provider, "SMS provider configured without credentials; SMS disabled");
        return Ok(None);
    };

    let base_url = config.api_base.as_deref().map(normalize_base_url).transpose()?;
    let http = HttpClient::builder().timeout_secs(config.timeout_secs).build()?;
    let gateway: Arc<dyn SmsGateway> = match config.provider {
        SmsProvider::Disabled => return Ok(None),
        SmsProvider::Eskiz => Arc::new(
            EskizSmsClient::new(http, login, password, &config.sender_id)
                .with_base_url(base_url.as_deref()),
        ),
        SmsProvider::PlayMobile => Arc::new(
            PlayMobileSmsClient::new(http, login, password, &config.sender_id)
                .with_base_url(base_url.as_deref()),
        ),
    };
    Ok(Some(gateway))
}
