//! Play Mobile (smsxabar) broker gateway.

use async_trait::async_trait;
use leadflow_core::SmsGateway;
use leadflow_domain::constants::PLAYMOBILE_API_BASE;
use leadflow_domain::{digits_only, LeadflowError, Result as DomainResult, SmsReceipt};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::http::HttpClient;

pub struct PlayMobileSmsClient {
    http: HttpClient,
    base_url: String,
    login: String,
    password: String,
    originator: String,
}

#[derive(Debug, Serialize)]
struct BrokerRequest<'a> {
    messages: Vec<BrokerMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct BrokerMessage<'a> {
    recipient: String,
    #[serde(rename = "message-id")]
    message_id: String,
    sms: BrokerSms<'a>,
}

#[derive(Debug, Serialize)]
struct BrokerSms<'a> {
    originator: &'a str,
    content: BrokerContent<'a>,
}

#[derive(Debug, Serialize)]
struct BrokerContent<'a> {
    text: &'a str,
}

impl PlayMobileSmsClient {
    pub fn new(http: HttpClient, login: &str, password: &str, originator: &str) -> Self {
        Self {
            http,
            base_url: PLAYMOBILE_API_BASE.to_string(),
            login: login.to_string(),
            password: password.to_string(),
            originator: originator.to_string(),
        }
    }

    /// Override the API base; `None` keeps the public endpoint.
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        if let Some(base) = base_url.map(str::trim).filter(|b| !b.is_empty()) {
            self.base_url = base.trim_end_matches('/').to_string();
        }
        self
    }
}

#[async_trait]
impl SmsGateway for PlayMobileSmsClient {
    fn provider(&self) -> &'static str {
        "playmobile"
    }

    async fn send_sms(&self, phone: &str, text: &str) -> DomainResult<SmsReceipt> {
        let recipient = digits_only(phone);
        if recipient.is_empty() {
            return Err(LeadflowError::InvalidInput(format!("No digits in phone number '{phone}'")));
        }
        let message_id = format!("lf{}", Uuid::new_v4().simple());
        let payload = BrokerRequest {
            messages: vec![BrokerMessage {
                recipient: recipient.clone(),
                message_id: message_id.clone(),
                sms: BrokerSms { originator: &self.originator, content: BrokerContent { text } },
            }],
        };
        let request = self
            .http
            .request(Method::POST, format!("{}/broker-api/send", self.base_url))
            .basic_auth(&self.login, Some(&self.password))
            .json(&payload);

        self.http.send_checked(request).await?;
        debug!(recipient, message_id, "play mobile accepted SMS");
        Ok(SmsReceipt { provider_message_id: Some(message_id), status: "accepted".into() })
    }
}
