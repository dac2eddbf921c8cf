//! ElevenLabs adapter: synchronous text-to-speech.
//!
//! Uses the `with-timestamps` endpoint, which answers JSON with the audio
//! base64-encoded, so the result can be persisted as text like every
//! other generation output.

use serde::Deserialize;

use crate::client::{AuthScheme, VendorClient};
use crate::error::VendorError;

/// Default public API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Voice used when the request does not name one.
const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Response shape of `POST /v1/text-to-speech/{voice}/with-timestamps`
/// (the fields we read).
#[derive(Debug, Deserialize)]
struct TtsResponse {
    audio_base64: String,
}

/// Text-to-speech client for the ElevenLabs API.
pub struct ElevenLabs {
    client: VendorClient,
}

impl ElevenLabs {
    /// Create an adapter against the given base URL (overridable for
    /// tests) with the user's API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: VendorClient::new("elevenlabs", base_url, AuthScheme::XiApiKey, api_key),
        }
    }

    /// Synthesize speech for a text. Synchronous: the vendor answers
    /// within the request. Returns the base64-encoded audio.
    ///
    /// `parameters` may carry a `"voice_id"` override.
    pub async fn synthesize(
        &self,
        text: &str,
        parameters: &serde_json::Value,
    ) -> Result<String, VendorError> {
        let voice_id = parameters
            .get("voice_id")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_VOICE_ID);

        let body = serde_json::json!({ "text": text });
        let response: TtsResponse = self
            .client
            .post_json(
                &format!("/v1/text-to-speech/{voice_id}/with-timestamps"),
                &body,
            )
            .await?;

        if response.audio_base64.is_empty() {
            return Err(VendorError::UnexpectedResponse(
                "text-to-speech returned empty audio".to_string(),
            ));
        }
        Ok(response.audio_base64)
    }

    /// Configuration-test probe: read the account's user record.
    pub async fn probe(&self) -> Result<(), VendorError> {
        self.client.get_ok("/v1/user").await
    }
}
