//! Bounded, cancellable polling for asynchronous vendor jobs.
//!
//! The original proxies polled on a fixed interval with no cancellation
//! hook; a caller that gave up left the loop running to its bound. Here
//! the loop sleeps on an exponential-backoff schedule ([`PollPolicy`]),
//! races every sleep against a [`CancellationToken`], and returns a
//! typed timeout when the attempt bound is exhausted.

use nexusone_core::polling::PollPolicy;
use tokio_util::sync::CancellationToken;

use crate::error::VendorError;

/// Outcome of a single status probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome<T> {
    /// The job is still running; keep polling.
    Pending,
    /// The job finished successfully with this output.
    Completed(T),
    /// The vendor reported the job failed.
    Failed(String),
}

/// Poll `probe` until it reports a terminal outcome.
///
/// * Sleeps `policy.delay_for(attempt)` before each probe.
/// * Returns [`VendorError::Cancelled`] as soon as `cancel` trips,
///   including mid-sleep.
/// * Returns [`VendorError::PollTimeout`] after `policy.max_attempts`
///   pending probes.
/// * Probe errors propagate immediately; a vendor that answers with an
///   error is not retried (matching the original's no-retry policy for
///   vendor HTTP errors).
pub async fn poll_until_terminal<T, F, Fut>(
    policy: &PollPolicy,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<T, VendorError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<ProbeOutcome<T>, VendorError>>,
{
    for attempt in 0..policy.max_attempts {
        let delay = policy.delay_for(attempt);
        tokio::select! {
            _ = cancel.cancelled() => return Err(VendorError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        if cancel.is_cancelled() {
            return Err(VendorError::Cancelled);
        }

        match probe().await? {
            ProbeOutcome::Pending => {
                tracing::debug!(attempt, ?delay, "vendor job still pending");
            }
            ProbeOutcome::Completed(output) => return Ok(output),
            ProbeOutcome::Failed(reason) => return Err(VendorError::JobFailed(reason)),
        }
    }

    Err(VendorError::PollTimeout {
        attempts: policy.max_attempts,
    })
}
