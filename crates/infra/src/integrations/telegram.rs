//! Telegram Bot API sender.

use async_trait::async_trait;
use leadflow_core::TelegramSender;
use leadflow_domain::{LeadflowError, Result as DomainResult, TelegramConfig};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::http::{normalize_base_url, HttpClient};

/// Sends HTML messages through `sendMessage`.
pub struct TelegramClient {
    http: HttpClient,
    api_base: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(http: HttpClient, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { http, api_base, token: token.into() }
    }

    /// Client for the configured bot, or `None` when no token is set.
    pub fn from_config(config: &TelegramConfig) -> DomainResult<Option<Self>> {
        let Some(token) = config.token() else {
            return Ok(None);
        };
        let api_base = normalize_base_url(&config.api_base)?;
        let http = HttpClient::builder().timeout_secs(config.timeout_secs).build()?;
        Ok(Some(Self::new(http, api_base, token)))
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl TelegramSender for TelegramClient {
    async fn send_message(&self, chat_id: &str, html: &str) -> DomainResult<()> {
        let form = [("chat_id", chat_id), ("text", html), ("parse_mode", "HTML")];
        let request = self.http.request(Method::POST, self.endpoint()).form(&form);
        let response = self.http.send_checked(request).await?;

        let body: BotResponse = response
            .json()
            .await
            .map_err(|err| {
                LeadflowError::Network(format!("invalid Telegram response: {}", err.without_url()))
            })?;
        if !body.ok {
            return Err(LeadflowError::Network(format!(
                "Telegram rejected message: {}",
                body.description.unwrap_or_default()
            )));
        }
        debug!(chat_id, "telegram message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> TelegramClient {
        TelegramClient::new(HttpClient::new().unwrap(), format!("{}/", server.uri()), "123:abc")
    }

    #[tokio::test]
    async fn posts_html_form_to_bot_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_string_contains("chat_id=555001"))
            .and(body_string_contains("parse_mode=HTML"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true,"result":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).send_message("555001", "<b>Yangi</b>").await.unwrap();
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).send_message("1", "x").await.unwrap_err();
        assert!(matches!(err, LeadflowError::Network(_)));
    }

    #[tokio::test]
    async fn not_ok_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"ok":false,"description":"bot was blocked"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server).send_message("1", "x").await.unwrap_err();
        assert!(err.to_string().contains("bot was blocked"));
    }

    #[tokio::test]
    async fn dropped_connection_error_omits_bot_token() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
        });

        let client = TelegramClient::new(
            HttpClient::new().unwrap(),
            format!("http://{addr}"),
            "123456:SECRETTOKEN",
        );
        let err = client.send_message("1", "x").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, LeadflowError::Network(_)));
        assert!(!err.to_string().contains("SECRETTOKEN"), "token leaked: {err}");
    }

    #[test]
    fn missing_token_builds_no_client() {
        assert!(TelegramClient::from_config(&TelegramConfig::default()).unwrap().is_none());
    }

    #[test]
    fn invalid_api_base_is_a_config_error() {
        let config = TelegramConfig {
            bot_token: Some("1:a".into()),
            api_base: "telegram".into(),
            ..TelegramConfig::default()
        };
        assert!(matches!(TelegramClient::from_config(&config), Err(LeadflowError::Config(_))));
    }
}
