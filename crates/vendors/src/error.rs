/// Errors from the vendor proxy layer.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The vendor returned a non-2xx status code. Status and body are
    /// passed through verbatim for the caller to surface.
    #[error("Vendor API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The vendor response parsed, but lacked a field the adapter needs.
    #[error("Unexpected vendor response: {0}")]
    UnexpectedResponse(String),

    /// The vendor reported the job failed.
    #[error("Vendor job failed: {0}")]
    JobFailed(String),

    /// The polling attempt bound was exhausted without reaching a
    /// terminal state.
    #[error("Vendor polling timed out after {attempts} attempts")]
    PollTimeout { attempts: u32 },

    /// Polling was abandoned via the cancellation token.
    #[error("Vendor polling cancelled")]
    Cancelled,
}
