//! Eskiz.uz SMS gateway.
//!
//! Logs in with e-mail and password to obtain a bearer token, caches it, and
//! drops it when the gateway answers 401 so the next send logs in again.

use async_trait::async_trait;
use leadflow_core::SmsGateway;
use leadflow_domain::constants::ESKIZ_API_BASE;
use leadflow_domain::{digits_only, LeadflowError, Result as DomainResult, SmsReceipt};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::http::HttpClient;

const ACCEPTED_STATUSES: [&str; 2] = ["waiting", "success"];

pub struct EskizSmsClient {
    http: HttpClient,
    base_url: String,
    email: String,
    password: String,
    sender: String,
    token: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl EskizSmsClient {
    pub fn new(http: HttpClient, email: &str, password: &str, sender: &str) -> Self {
        Self {
            http,
            base_url: ESKIZ_API_BASE.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            sender: sender.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Override the API base; `None` keeps the public endpoint.
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        if let Some(base) = base_url.map(str::trim).filter(|b| !b.is_empty()) {
            self.base_url = base.trim_end_matches('/').to_string();
        }
        self
    }

    async fn login(&self) -> DomainResult<String> {
        let form = [("email", self.email.as_str()), ("password", self.password.as_str())];
        let request =
            self.http.request(Method::POST, format!("{}/api/auth/login", self.base_url)).form(&form);
        let response = self.http.send_checked(request).await?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|err| {
                LeadflowError::Auth(format!("Eskiz login response: {}", err.without_url()))
            })?;
        info!("eskiz token refreshed");
        Ok(body.data.token)
    }

    async fn bearer(&self) -> DomainResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.login().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl SmsGateway for EskizSmsClient {
    fn provider(&self) -> &'static str {
        "eskiz"
    }

    async fn send_sms(&self, phone: &str, text: &str) -> DomainResult<SmsReceipt> {
        let recipient = digits_only(phone);
        if recipient.is_empty() {
            return Err(LeadflowError::InvalidInput(format!("No digits in phone number '{phone}'")));
        }
        let token = self.bearer().await?;
        let form = [
            ("mobile_phone", recipient.as_str()),
            ("message", text),
            ("from", self.sender.as_str()),
        ];
        let request = self
            .http
            .request(Method::POST, format!("{}/api/message/sms/send", self.base_url))
            .bearer_auth(token)
            .form(&form);

        let response = self.http.send(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
            return Err(LeadflowError::Auth("Eskiz token rejected".into()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(crate::errors::status_error(status, Some(&body)));
        }

        let body: SendResponse = response
            .json()
            .await
            .map_err(|err| {
                LeadflowError::Network(format!("invalid Eskiz response: {}", err.without_url()))
            })?;
        let status = body.status.unwrap_or_default();
        if !ACCEPTED_STATUSES.contains(&status.as_str()) {
            return Err(LeadflowError::Network(format!(
                "Eskiz did not accept SMS: {} {}",
                status,
                body.message.unwrap_or_default()
            )));
        }

        let provider_message_id = body.id.map(|id| match id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        debug!(recipient, ?provider_message_id, status, "eskiz accepted SMS");
        Ok(SmsReceipt { provider_message_id, status })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> EskizSmsClient {
        EskizSmsClient::new(HttpClient::new().unwrap(), "ops@example.uz", "secret", "4546")
            .with_base_url(Some(server.uri().as_str()))
    }

    async fn mount_login(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"message":"token_generated","data":{"token":"tkn"}}"#),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn logs_in_once_and_sends_with_bearer() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/api/message/sms/send"))
            .and(header("authorization", "Bearer tkn"))
            .and(body_string_contains("mobile_phone=998901234567"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id":"4385062","status":"waiting","message":"Waiting"}"#),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server);
        let receipt = client.send_sms("+998 90 123 45 67", "Salom").await.unwrap();
        assert_eq!(receipt.status, "waiting");
        assert_eq!(receipt.provider_message_id.as_deref(), Some("4385062"));

        client.send_sms("998901234567", "Yana").await.unwrap();
    }

    #[tokio::test]
    async fn unexpected_status_is_rejected() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/api/message/sms/send"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id":null,"status":"error","message":"limit"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server).send_sms("998901234567", "x").await.unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[tokio::test]
    async fn unauthorized_send_drops_cached_token() {
        let server = MockServer::start().await;
        mount_login(&server, 2).await;
        Mock::given(method("POST"))
            .and(path("/api/message/sms/send"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(client.send_sms("998901234567", "x").await, Err(LeadflowError::Auth(_))));
        assert!(matches!(client.send_sms("998901234567", "x").await, Err(LeadflowError::Auth(_))));
    }
}
