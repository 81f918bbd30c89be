//! HTTP client for Claude API

use std::time::Duration;

use reqwest::Client;

use super::error::ClaudeError;
use super::models::{CreateMessageRequest, MessageResponse};

/// Claude API client
pub struct ClaudeClient {
    /// HTTP client
    client: Client,
    /// API key for authentication
    api_key: String,
}

impl ClaudeClient {
    /// Claude API base URL
    const API_URL: &'static str = "https://api.anthropic.com/v1/messages";
    /// API version header value
    const API_VERSION: &'static str = "2023-06-01";
    /// Generation of five questions rarely takes more than a minute
    const TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a new Claude client with the given API key
    pub fn new(api_key: String) -> Result<Self, ClaudeError> {
        let client = Client::builder().timeout(Self::TIMEOUT).build()?;

        Ok(Self { client, api_key })
    }

    /// Send a message request and return the complete response
    pub async fn send_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<MessageResponse, ClaudeError> {
        tracing::debug!("Sending Claude request (model {})", request.model);

        let response = self
            .client
            .post(Self::API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ClaudeError::RateLimited { retry_after_seconds: retry_after });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClaudeError::ApiError {
                status: 401,
                message: "Invalid API key".to_string(),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClaudeError::ApiError { status: status.as_u16(), message });
        }

        let body = response.text().await?;
        let message_response: MessageResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            "Claude response {}: {} in / {} out tokens",
            message_response.id,
            message_response.usage.input_tokens,
            message_response.usage.output_tokens
        );
        Ok(message_response)
    }

    /// Send a request and concatenate the text blocks of the reply
    pub async fn send_text(&self, request: &CreateMessageRequest) -> Result<String, ClaudeError> {
        let response = self.send_message(request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(ClaudeError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = ClaudeClient::new("sk-ant-test-key".to_string()).unwrap();
        assert_eq!(client.api_key, "sk-ant-test-key");
    }
}
