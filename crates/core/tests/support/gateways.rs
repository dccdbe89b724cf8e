//! Recording fakes for the outbound notification channels

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use leadflow_core::{SmsGateway, TelegramSender};
use leadflow_domain::{LeadflowError, Result as DomainResult, SmsReceipt};

/// Telegram sender that records `(chat_id, html)` pairs.
#[derive(Default, Clone)]
pub struct MockTelegram {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl MockTelegram {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelegramSender for MockTelegram {
    async fn send_message(&self, chat_id: &str, html: &str) -> DomainResult<()> {
        if self.fail {
            return Err(LeadflowError::Network("telegram unreachable".into()));
        }
        self.sent.lock().unwrap().push((chat_id.to_string(), html.to_string()));
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct MockSms {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSms {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsGateway for MockSms {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn send_sms(&self, phone: &str, text: &str) -> DomainResult<SmsReceipt> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((phone.to_string(), text.to_string()));
        Ok(SmsReceipt { provider_message_id: Some(sent.len().to_string()), status: "waiting".into() })
    }
}
