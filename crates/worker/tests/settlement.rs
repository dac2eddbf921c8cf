//! End-to-end settlement tests for the video worker.
//!
//! A local axum server stands in for the Luma API; each test seeds a
//! profile with credits and a credential, queues a generation, claims
//! it, and drives it through `process_claimed`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use sqlx::PgPool;

use nexusone_core::generation::{GenerationKind, GenerationStatus};
use nexusone_core::polling::PollPolicy;
use nexusone_db::models::api_config::UpsertApiConfiguration;
use nexusone_db::models::generation::{Generation, SubmitGeneration};
use nexusone_db::models::profile::CreateProfile;
use nexusone_db::repositories::{
    ApiConfigRepo, GenerationRepo, LedgerRepo, ProfileRepo,
};
use nexusone_worker::{process_claimed, WorkerConfig};

// ---------------------------------------------------------------------------
// Mock Luma server
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct MockState {
    probes: Arc<AtomicU32>,
    probes_needed: u32,
    fails: bool,
}

async fn create_job(Json(_body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "id": "job-77", "state": "queued" }))
}

async fn job_status(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    if state.fails {
        return Json(serde_json::json!({
            "id": id,
            "state": "failed",
            "failure_reason": "prompt rejected",
        }));
    }
    let probes = state.probes.fetch_add(1, Ordering::SeqCst) + 1;
    if probes < state.probes_needed {
        Json(serde_json::json!({ "id": id, "state": "dreaming" }))
    } else {
        Json(serde_json::json!({
            "id": id,
            "state": "completed",
            "assets": { "video": "https://cdn.mock/video.mp4" },
        }))
    }
}

async fn spawn_mock(state: MockState) -> String {
    let app = Router::new()
        .route("/dream-machine/v1/generations", post(create_job))
        .route("/dream-machine/v1/generations/{id}", get(job_status))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn mock_state(probes_needed: u32, fails: bool) -> MockState {
    MockState {
        probes: Arc::new(AtomicU32::new(0)),
        probes_needed,
        fails,
    }
}

/// Worker config with a millisecond schedule against the given mock.
fn fast_config(base_url: String, max_attempts: u32) -> WorkerConfig {
    WorkerConfig {
        luma_base_url: base_url,
        poll: PollPolicy {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(2),
            backoff_multiplier: 1.5,
            max_attempts,
        },
        idle_interval: Duration::from_millis(10),
        cancel_check_interval: Duration::from_millis(5),
    }
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

/// Create a profile with the given balance and a stored Luma credential.
async fn seed_profile(pool: &PgPool, email: &str, credits: i64) -> i64 {
    let profile = ProfileRepo::create(
        pool,
        &CreateProfile {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            plan_id: 1,
        },
    )
    .await
    .expect("profile creation should succeed");

    if credits > 0 {
        LedgerRepo::credit(pool, profile.id, credits, "signup_grant")
            .await
            .expect("grant should succeed");
    }

    ApiConfigRepo::upsert(
        pool,
        profile.id,
        "luma",
        &UpsertApiConfiguration {
            credential: "luma-good".to_string(),
            is_enabled: Some(true),
        },
    )
    .await
    .expect("config upsert should succeed");

    profile.id
}

/// Queue a video generation and claim it, returning the processing row.
async fn queue_and_claim(pool: &PgPool, profile_id: i64) -> Generation {
    GenerationRepo::create(
        pool,
        profile_id,
        "luma",
        &SubmitGeneration {
            kind: GenerationKind::Video,
            prompt: "product teaser".to_string(),
            parameters: serde_json::json!({ "aspect_ratio": "16:9" }),
        },
        GenerationStatus::Queued,
    )
    .await
    .expect("creation should succeed");

    GenerationRepo::claim_next_queued(pool)
        .await
        .expect("claim should succeed")
        .expect("a queued row exists")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// The happy path: the job completes, 30 credits are debited, the video
/// URL is persisted, and the quota counter moves.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_completed_job_settles_with_debit(pool: PgPool) {
    let base = spawn_mock(mock_state(3, false)).await;
    let config = fast_config(base, 20);
    let profile_id = seed_profile(&pool, "worker@test.com", 50).await;
    let claimed = queue_and_claim(&pool, profile_id).await;

    process_claimed(&pool, &config, &claimed)
        .await
        .expect("settlement should succeed");

    let row = GenerationRepo::find_by_id(&pool, claimed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), GenerationStatus::Completed);
    assert_eq!(row.output_url.as_deref(), Some("https://cdn.mock/video.mp4"));
    assert_eq!(row.credits_used, Some(30));
    assert_eq!(row.vendor_job_id.as_deref(), Some("job-77"));

    let balance = LedgerRepo::balance(&pool, profile_id).await.unwrap();
    assert_eq!(balance, Some(20));

    let profile = ProfileRepo::find_by_id(&pool, profile_id).await.unwrap().unwrap();
    assert_eq!(profile.videos_used, 1);

    let audit = LedgerRepo::audit_balance(&pool, profile_id).await.unwrap();
    assert!(audit.consistent);
}

/// A vendor-side failure marks the record failed and charges nothing.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_failed_job_charges_nothing(pool: PgPool) {
    let base = spawn_mock(mock_state(1, true)).await;
    let config = fast_config(base, 20);
    let profile_id = seed_profile(&pool, "jobfail@test.com", 50).await;
    let claimed = queue_and_claim(&pool, profile_id).await;

    process_claimed(&pool, &config, &claimed)
        .await
        .expect("settlement should succeed");

    let row = GenerationRepo::find_by_id(&pool, claimed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), GenerationStatus::Failed);
    assert!(row.error_message.as_deref().unwrap().contains("prompt rejected"));
    assert!(row.credits_used.is_none());

    let balance = LedgerRepo::balance(&pool, profile_id).await.unwrap();
    assert_eq!(balance, Some(50));
}

/// An exhausted polling budget marks the record failed without charging.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_poll_timeout_fails_without_charge(pool: PgPool) {
    // The job never completes within the 3 allowed probes.
    let base = spawn_mock(mock_state(100, false)).await;
    let config = fast_config(base, 3);
    let profile_id = seed_profile(&pool, "timeout@test.com", 50).await;
    let claimed = queue_and_claim(&pool, profile_id).await;

    process_claimed(&pool, &config, &claimed)
        .await
        .expect("settlement should succeed");

    let row = GenerationRepo::find_by_id(&pool, claimed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), GenerationStatus::Failed);

    let balance = LedgerRepo::balance(&pool, profile_id).await.unwrap();
    assert_eq!(balance, Some(50));
}

/// A cancel flag set while the job is polling stops the loop and settles
/// the record failed without charging.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_flag_stops_polling(pool: PgPool) {
    // Never completes; the cancel watcher must break the loop.
    let base = spawn_mock(mock_state(u32::MAX, false)).await;
    let mut config = fast_config(base, 10_000);
    config.poll.initial_interval = Duration::from_millis(20);
    config.poll.max_interval = Duration::from_millis(20);

    let profile_id = seed_profile(&pool, "cancel@test.com", 50).await;
    let claimed = queue_and_claim(&pool, profile_id).await;

    GenerationRepo::request_cancel(&pool, claimed.id, profile_id)
        .await
        .expect("cancel request should succeed");

    process_claimed(&pool, &config, &claimed)
        .await
        .expect("settlement should succeed");

    let row = GenerationRepo::find_by_id(&pool, claimed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), GenerationStatus::Failed);
    assert_eq!(row.error_message.as_deref(), Some("cancelled by user"));

    let balance = LedgerRepo::balance(&pool, profile_id).await.unwrap();
    assert_eq!(balance, Some(50));
}

/// If the balance is spent while the job runs, settlement fails the
/// record instead of overdrawing.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_insufficient_balance_at_settlement(pool: PgPool) {
    let base = spawn_mock(mock_state(1, false)).await;
    let config = fast_config(base, 20);
    let profile_id = seed_profile(&pool, "spent@test.com", 50).await;
    let claimed = queue_and_claim(&pool, profile_id).await;

    // A concurrent spend drains the balance below the video cost.
    LedgerRepo::debit(&pool, profile_id, 45, "openai")
        .await
        .expect("debit should succeed")
        .expect("balance is sufficient");

    process_claimed(&pool, &config, &claimed)
        .await
        .expect("settlement should succeed");

    let row = GenerationRepo::find_by_id(&pool, claimed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), GenerationStatus::Failed);
    assert!(row
        .error_message
        .as_deref()
        .unwrap()
        .contains("insufficient credits"));

    let balance = LedgerRepo::balance(&pool, profile_id).await.unwrap();
    assert_eq!(balance, Some(5));
}

/// A missing credential fails the claim immediately.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_credential_fails_claim(pool: PgPool) {
    let base = spawn_mock(mock_state(1, false)).await;
    let config = fast_config(base, 20);
    let profile_id = seed_profile(&pool, "nocred@test.com", 50).await;

    // Disable the credential after seeding.
    let cfg = ApiConfigRepo::find(&pool, profile_id, "luma").await.unwrap().unwrap();
    ApiConfigRepo::upsert(
        &pool,
        profile_id,
        "luma",
        &UpsertApiConfiguration {
            credential: cfg.credential,
            is_enabled: Some(false),
        },
    )
    .await
    .unwrap();

    let claimed = queue_and_claim(&pool, profile_id).await;

    process_claimed(&pool, &config, &claimed)
        .await
        .expect("settlement should succeed");

    let row = GenerationRepo::find_by_id(&pool, claimed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), GenerationStatus::Failed);
    assert!(row
        .error_message
        .as_deref()
        .unwrap()
        .contains("no enabled API configuration"));
}
