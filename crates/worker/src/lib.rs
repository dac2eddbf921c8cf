//! Background worker for asynchronous video generations.
//!
//! The worker claims queued generation records (one at a time per
//! instance, `FOR UPDATE SKIP LOCKED` keeps concurrent instances from
//! double-claiming), submits the job to the vendor, polls it to a
//! terminal state, and settles the record: debit on success, no charge
//! on failure, timeout, or cancellation.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use nexusone_core::credits::COST_VIDEO;
use nexusone_core::polling::PollPolicy;
use nexusone_db::models::generation::Generation;
use nexusone_db::repositories::{
    ApiConfigRepo, GenerationRepo, LedgerError, LedgerRepo, ProfileRepo, QuotaResource,
};
use nexusone_db::DbPool;
use nexusone_vendors::luma::Luma;
use nexusone_vendors::poll::poll_until_terminal;
use nexusone_vendors::VendorError;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base URL of the Luma Dream Machine API.
    pub luma_base_url: String,
    /// Backoff schedule for vendor job polling.
    pub poll: PollPolicy,
    /// How long to sleep when the queue is empty.
    pub idle_interval: Duration,
    /// How often to check the database cancel flag while polling.
    pub cancel_check_interval: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                            | Default                    |
    /// |------------------------------------|----------------------------|
    /// | `LUMA_BASE_URL`                    | `https://api.lumalabs.ai`  |
    /// | `WORKER_IDLE_INTERVAL_SECS`        | `5`                        |
    /// | `WORKER_CANCEL_CHECK_INTERVAL_SECS`| `2`                        |
    pub fn from_env() -> Self {
        let luma_base_url = std::env::var("LUMA_BASE_URL")
            .unwrap_or_else(|_| nexusone_vendors::luma::DEFAULT_BASE_URL.into());

        let idle_interval_secs: u64 = std::env::var("WORKER_IDLE_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("WORKER_IDLE_INTERVAL_SECS must be a valid u64");

        let cancel_check_secs: u64 = std::env::var("WORKER_CANCEL_CHECK_INTERVAL_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("WORKER_CANCEL_CHECK_INTERVAL_SECS must be a valid u64");

        Self {
            luma_base_url,
            poll: PollPolicy::default(),
            idle_interval: Duration::from_secs(idle_interval_secs),
            cancel_check_interval: Duration::from_secs(cancel_check_secs),
        }
    }
}

/// Ledger reason recorded when a video job settles.
const VIDEO_DEBIT_REASON: &str = "luma";

/// Run the claim loop until `shutdown` trips.
///
/// Settlement writes that fail (database errors) are logged and the loop
/// continues; the claimed row stays in processing and can be recovered
/// by an operator.
pub async fn run(pool: DbPool, config: WorkerConfig, shutdown: CancellationToken) {
    tracing::info!(
        luma_base_url = %config.luma_base_url,
        poll_budget_secs = config.poll.total_budget().as_secs(),
        "worker started"
    );

    loop {
        if shutdown.is_cancelled() {
            break;
        }

        match GenerationRepo::claim_next_queued(&pool).await {
            Ok(Some(generation)) => {
                let id = generation.id;
                if let Err(err) = process_claimed(&pool, &config, &generation).await {
                    tracing::error!(generation_id = id, error = %err, "settlement write failed");
                }
            }
            Ok(None) => {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(config.idle_interval) => {}
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "queue claim failed");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(config.idle_interval) => {}
                }
            }
        }
    }

    tracing::info!("worker stopped");
}

/// Drive one claimed generation to a terminal state.
///
/// Vendor failures, poll timeouts, and cancellations mark the record
/// failed without charging. Only a successful vendor job followed by a
/// successful debit completes the record.
pub async fn process_claimed(
    pool: &DbPool,
    config: &WorkerConfig,
    generation: &Generation,
) -> Result<(), LedgerError> {
    tracing::info!(
        generation_id = generation.id,
        profile_id = generation.profile_id,
        "processing claimed generation"
    );

    let Some(credential) =
        ApiConfigRepo::find_enabled(pool, generation.profile_id, &generation.service).await?
    else {
        let reason = format!(
            "no enabled API configuration for service '{}'",
            generation.service
        );
        GenerationRepo::fail(pool, generation.id, &reason).await?;
        return Ok(());
    };

    let luma = Luma::new(&config.luma_base_url, &credential.credential);

    let job_id = match luma
        .create_generation(&generation.prompt, &generation.parameters)
        .await
    {
        Ok(job_id) => job_id,
        Err(err) => {
            GenerationRepo::fail(pool, generation.id, &err.to_string()).await?;
            return Ok(());
        }
    };
    GenerationRepo::set_vendor_job(pool, generation.id, &job_id).await?;

    // Watch the database cancel flag while polling; the token trips the
    // poll loop mid-sleep.
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(watch_cancel_flag(
        pool.clone(),
        generation.id,
        config.cancel_check_interval,
        cancel.clone(),
    ));

    let outcome = poll_until_terminal(&config.poll, &cancel, || luma.probe_generation(&job_id)).await;
    watcher.abort();

    match outcome {
        Ok(video_url) => settle_completed(pool, generation, &video_url).await,
        Err(VendorError::Cancelled) => {
            tracing::info!(generation_id = generation.id, "generation cancelled");
            GenerationRepo::fail(pool, generation.id, "cancelled by user").await?;
            Ok(())
        }
        Err(err) => {
            tracing::warn!(generation_id = generation.id, error = %err, "vendor job did not complete");
            GenerationRepo::fail(pool, generation.id, &err.to_string()).await?;
            Ok(())
        }
    }
}

/// Debit and complete a successfully finished job.
async fn settle_completed(
    pool: &DbPool,
    generation: &Generation,
    video_url: &str,
) -> Result<(), LedgerError> {
    let debited = LedgerRepo::debit(
        pool,
        generation.profile_id,
        COST_VIDEO,
        VIDEO_DEBIT_REASON,
    )
    .await?;

    if debited.is_none() {
        // The balance was spent elsewhere while the job ran. The output
        // exists on the vendor side but is not delivered unpaid.
        GenerationRepo::fail(pool, generation.id, "insufficient credits at settlement").await?;
        return Ok(());
    }

    GenerationRepo::complete(pool, generation.id, Some(video_url), None, COST_VIDEO).await?;
    ProfileRepo::increment_usage(pool, generation.profile_id, QuotaResource::Videos).await?;

    tracing::info!(
        generation_id = generation.id,
        profile_id = generation.profile_id,
        credits_used = COST_VIDEO,
        "video generation completed"
    );
    Ok(())
}

/// Trip `cancel` once the record's cancel flag is observed set.
async fn watch_cancel_flag(
    pool: DbPool,
    generation_id: i64,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::time::sleep(interval).await;
        match GenerationRepo::is_cancel_requested(&pool, generation_id).await {
            Ok(true) => {
                cancel.cancel();
                return;
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(generation_id, error = %err, "cancel flag check failed");
            }
        }
    }
}
