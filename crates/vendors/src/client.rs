//! Shared HTTP client for vendor APIs.
//!
//! [`VendorClient`] holds a service name, base URL, credential, and the
//! vendor's auth header convention. Adapters build requests through it so
//! auth application and error normalization live in one place.

use reqwest::RequestBuilder;

use crate::error::VendorError;

/// Auth header conventions across the supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>` (OpenAI, Luma, Gupshup).
    Bearer,
    /// `xi-api-key: <key>` (ElevenLabs).
    XiApiKey,
    /// `Authorization: Token <key>` (Replicate).
    Token,
    /// `apikey: <key>` (CJ Dropshipping).
    ApiKey,
    /// `Authorization: Client-ID <key>` (Unsplash).
    ClientId,
}

impl AuthScheme {
    /// Apply this scheme's header to a request.
    fn apply(self, builder: RequestBuilder, credential: &str) -> RequestBuilder {
        match self {
            AuthScheme::Bearer => builder.bearer_auth(credential),
            AuthScheme::XiApiKey => builder.header("xi-api-key", credential),
            AuthScheme::Token => builder.header("Authorization", format!("Token {credential}")),
            AuthScheme::ApiKey => builder.header("apikey", credential),
            AuthScheme::ClientId => {
                builder.header("Authorization", format!("Client-ID {credential}"))
            }
        }
    }
}

/// HTTP client for a single vendor, parameterized by auth scheme.
#[derive(Debug, Clone)]
pub struct VendorClient {
    client: reqwest::Client,
    service: String,
    base_url: String,
    scheme: AuthScheme,
    credential: String,
}

impl VendorClient {
    /// Create a client for a vendor.
    ///
    /// * `service`    - short service name used in logs (`"openai"`, ...).
    /// * `base_url`   - API base URL without a trailing slash.
    /// * `scheme`     - the vendor's auth header convention.
    /// * `credential` - the user's API key for this vendor.
    pub fn new(
        service: impl Into<String>,
        base_url: impl Into<String>,
        scheme: AuthScheme,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            service: service.into(),
            base_url: base_url.into(),
            scheme,
            credential: credential.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling across vendors).
    pub fn with_client(
        client: reqwest::Client,
        service: impl Into<String>,
        base_url: impl Into<String>,
        scheme: AuthScheme,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            client,
            service: service.into(),
            base_url: base_url.into(),
            scheme,
            credential: credential.into(),
        }
    }

    /// Short service name (`"openai"`, `"luma"`, ...).
    pub fn service(&self) -> &str {
        &self.service
    }

    /// API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send an authenticated `POST` with a JSON body and parse the JSON
    /// response.
    pub async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, VendorError> {
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        let response = self.scheme.apply(builder, &self.credential).send().await?;
        Self::parse_response(response).await
    }

    /// Send an authenticated `GET` and parse the JSON response.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, VendorError> {
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let response = self.scheme.apply(builder, &self.credential).send().await?;
        Self::parse_response(response).await
    }

    /// Send an authenticated `GET` and assert success, discarding the
    /// body. Used for configuration-test probes.
    pub async fn get_ok(&self, path: &str) -> Result<(), VendorError> {
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let response = self.scheme.apply(builder, &self.credential).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`VendorError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VendorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VendorError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VendorError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
