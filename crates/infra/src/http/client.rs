use std::time::Duration;

use leadflow_domain::constants::DEFAULT_NOTIFY_TIMEOUT_SECS;
use leadflow_domain::LeadflowError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::{status_error, InfraError};

/// Single-attempt HTTP client with a short timeout.
///
/// Notification deliveries are never retried here; a failed send is recorded
/// on the outbox entry instead.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with the default notification timeout.
    pub fn new() -> Result<Self, LeadflowError> {
        Self::builder().build()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request once. Transport failures become `Network` errors;
    /// any HTTP status is returned as-is.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, LeadflowError> {
        let request = builder.build().map_err(to_domain)?;
        let method = request.method().clone();
        // Bot tokens live in the path; log the host only.
        let host = request.url().host_str().unwrap_or_default().to_string();
        debug!(%method, host, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, host, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                let err = to_domain(err);
                debug!(%method, host, error = %err, "HTTP request failed");
                Err(err)
            }
        }
    }

    /// Execute the request and turn a non-2xx status into a domain error that
    /// carries the start of the response body.
    pub async fn send_checked(&self, builder: RequestBuilder) -> Result<Response, LeadflowError> {
        let response = self.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.ok();
        Err(status_error(status, body.as_deref()))
    }
}

fn to_domain(err: reqwest::Error) -> LeadflowError {
    let infra: InfraError = err.into();
    LeadflowError::from(infra)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS), user_agent: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs.max(1)))
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, LeadflowError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(to_domain)?;
        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::StatusCode;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn checked_send_maps_status_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let err = client
            .send_checked(client.request(Method::POST, server.uri()))
            .await
            .expect_err("bad request");

        match err {
            LeadflowError::InvalidInput(msg) => assert!(msg.contains("chat not found")),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::builder().timeout_secs(2).build().expect("http client");
        let result = client.send(client.request(Method::GET, format!("http://{addr}"))).await;

        assert!(matches!(result, Err(LeadflowError::Network(_))));
    }
}
