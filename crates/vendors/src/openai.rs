//! OpenAI adapter: synchronous chat-completion content generation.

use serde::Deserialize;

use crate::client::{AuthScheme, VendorClient};
use crate::error::VendorError;

/// Default public API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Model used when the request does not name one.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Response shape of `POST /v1/chat/completions` (the fields we read).
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

/// Content-generation client for the OpenAI API.
pub struct OpenAi {
    client: VendorClient,
}

impl OpenAi {
    /// Create an adapter against the given base URL (overridable for
    /// tests) with the user's API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: VendorClient::new("openai", base_url, AuthScheme::Bearer, api_key),
        }
    }

    /// Generate marketing copy for a prompt. Synchronous: the vendor
    /// answers within the request.
    ///
    /// `parameters` may carry a `"model"` override; everything else uses
    /// vendor defaults.
    pub async fn generate_content(
        &self,
        prompt: &str,
        parameters: &serde_json::Value,
    ) -> Result<String, VendorError> {
        let model = parameters
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_MODEL);

        let body = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let response: ChatCompletionResponse =
            self.client.post_json("/v1/chat/completions", &body).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                VendorError::UnexpectedResponse("chat completion returned no choices".to_string())
            })?;
        Ok(content)
    }

    /// Configuration-test probe: list models with the stored credential.
    pub async fn probe(&self) -> Result<(), VendorError> {
        self.client.get_ok("/v1/models").await
    }
}
