//! Luma Dream Machine adapter: asynchronous video generation.
//!
//! Submission returns a vendor job id; the job is then probed until it
//! reaches `completed` or `failed`. The probe is shaped for
//! [`poll_until_terminal`](crate::poll::poll_until_terminal).

use serde::Deserialize;

use crate::client::{AuthScheme, VendorClient};
use crate::error::VendorError;
use crate::poll::ProbeOutcome;

/// Default public API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.lumalabs.ai";

/// A generation resource as returned by the Dream Machine API.
#[derive(Debug, Deserialize)]
pub struct LumaGeneration {
    pub id: String,
    /// `queued`, `dreaming`, `completed`, or `failed`.
    pub state: String,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub assets: Option<LumaAssets>,
}

#[derive(Debug, Deserialize)]
pub struct LumaAssets {
    #[serde(default)]
    pub video: Option<String>,
}

/// Video-generation client for the Luma Dream Machine API.
pub struct Luma {
    client: VendorClient,
}

impl Luma {
    /// Create an adapter against the given base URL (overridable for
    /// tests) with the user's API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: VendorClient::new("luma", base_url, AuthScheme::Bearer, api_key),
        }
    }

    /// Submit a video generation job. Returns the vendor job id; the job
    /// runs asynchronously on the vendor side.
    ///
    /// `parameters` may carry `"aspect_ratio"` and `"loop"` overrides.
    pub async fn create_generation(
        &self,
        prompt: &str,
        parameters: &serde_json::Value,
    ) -> Result<String, VendorError> {
        let mut body = serde_json::json!({ "prompt": prompt });
        for key in ["aspect_ratio", "loop"] {
            if let Some(value) = parameters.get(key) {
                body[key] = value.clone();
            }
        }

        let generation: LumaGeneration = self
            .client
            .post_json("/dream-machine/v1/generations", &body)
            .await?;
        Ok(generation.id)
    }

    /// Probe a job once, translating the vendor state into a
    /// [`ProbeOutcome`] carrying the video URL on completion.
    pub async fn probe_generation(
        &self,
        job_id: &str,
    ) -> Result<ProbeOutcome<String>, VendorError> {
        let generation: LumaGeneration = self
            .client
            .get_json(&format!("/dream-machine/v1/generations/{job_id}"))
            .await?;

        match generation.state.as_str() {
            "completed" => {
                let url = generation
                    .assets
                    .and_then(|a| a.video)
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| {
                        VendorError::UnexpectedResponse(
                            "completed generation carries no video asset".to_string(),
                        )
                    })?;
                Ok(ProbeOutcome::Completed(url))
            }
            "failed" => Ok(ProbeOutcome::Failed(
                generation
                    .failure_reason
                    .unwrap_or_else(|| "vendor reported failure without a reason".to_string()),
            )),
            // queued, dreaming, and anything the vendor adds later.
            _ => Ok(ProbeOutcome::Pending),
        }
    }

    /// Configuration-test probe: read the account's credit state.
    pub async fn probe(&self) -> Result<(), VendorError> {
        self.client.get_ok("/dream-machine/v1/credits").await
    }
}
