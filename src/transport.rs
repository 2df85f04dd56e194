use crate::errors::SdkError;
use async_trait::async_trait;
use std::time::Duration;

/// Raw result of one HTTP exchange with the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOutcome {
    pub success: bool,
    pub body: String,
    pub error: String,
}

impl TransportOutcome {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            success: true,
            body: body.into(),
            error: String::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            body: String::new(),
            error: error.into(),
        }
    }
}

/// HTTP collaborator used to reach the gateway.
///
/// `authorization` is the `token:key` pair; implementations decide how to put
/// it on the wire. Failures are reported in the outcome, never as panics.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, authorization: &str, url: &str, body: &str) -> TransportOutcome;

    async fn get(&self, authorization: &str, url: &str) -> TransportOutcome;
}

/// reqwest-backed transport sending the credential as HTTP Basic auth.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a new `HttpTransport`.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Overall timeout for each request.
    pub fn new(timeout: Duration) -> Result<Self, SdkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SdkError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    fn authorize(&self, request: reqwest::RequestBuilder, authorization: &str) -> reqwest::RequestBuilder {
        match authorization.split_once(':') {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request.basic_auth(authorization, None::<&str>),
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder, url: &str) -> TransportOutcome {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Moip request to {} failed: {}", url, e);
                return TransportOutcome::failed(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to read Moip response from {}: {}", url, e);
                return TransportOutcome::failed(format!("Failed to read response: {}", e));
            }
        };

        if !status.is_success() {
            tracing::error!("Moip returned {} for {}", status, url);
            return TransportOutcome::failed(format!("Moip returned {}: {}", status, body));
        }

        TransportOutcome::ok(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, authorization: &str, url: &str, body: &str) -> TransportOutcome {
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(body.to_string());
        let request = self.authorize(request, authorization);
        self.execute(request, url).await
    }

    async fn get(&self, authorization: &str, url: &str) -> TransportOutcome {
        let request = self.authorize(self.client.get(url), authorization);
        self.execute(request, url).await
    }
}
