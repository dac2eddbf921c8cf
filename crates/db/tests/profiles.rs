//! Integration tests for profiles and vendor API configurations.

use nexusone_db::models::api_config::UpsertApiConfiguration;
use nexusone_db::models::profile::CreateProfile;
use nexusone_db::repositories::{ApiConfigRepo, ProfileRepo, QuotaResource};
use sqlx::PgPool;

async fn create_profile(pool: &PgPool, email: &str) -> i64 {
    let input = CreateProfile {
        email: email.to_string(),
        password_hash: "$argon2id$fake".to_string(),
        plan_id: 2,
    };
    ProfileRepo::create(pool, &input)
        .await
        .expect("profile creation should succeed")
        .id
}

/// Profiles are soft-disabled, never deleted: the row survives with
/// is_active = false and a second deactivation is a no-op.
#[sqlx::test(migrations = "./migrations")]
async fn test_soft_deactivation(pool: PgPool) {
    let id = create_profile(&pool, "gone@test.com").await;

    assert!(ProfileRepo::deactivate(&pool, id).await.unwrap());
    assert!(!ProfileRepo::deactivate(&pool, id).await.unwrap());

    let row = ProfileRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(!row.is_active);
    assert_eq!(row.email, "gone@test.com");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_rejected(pool: PgPool) {
    create_profile(&pool, "dup@test.com").await;

    let input = CreateProfile {
        email: "dup@test.com".to_string(),
        password_hash: "$argon2id$other".to_string(),
        plan_id: 1,
    };
    let err = ProfileRepo::create(&pool, &input).await.unwrap_err();
    match err {
        sqlx::Error::Database(db) => {
            assert_eq!(db.code().as_deref(), Some("23505"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_quota_counters_increment(pool: PgPool) {
    let id = create_profile(&pool, "quota@test.com").await;

    ProfileRepo::increment_usage(&pool, id, QuotaResource::Videos)
        .await
        .unwrap();
    ProfileRepo::increment_usage(&pool, id, QuotaResource::Videos)
        .await
        .unwrap();
    ProfileRepo::increment_usage(&pool, id, QuotaResource::WhatsappNumbers)
        .await
        .unwrap();

    let row = ProfileRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.videos_used, 2);
    assert_eq!(row.whatsapp_numbers_used, 1);
    assert_eq!(row.pages_used, 0);
}

/// Upsert replaces the credential and clears the stale test result.
#[sqlx::test(migrations = "./migrations")]
async fn test_api_config_upsert_resets_test_state(pool: PgPool) {
    let id = create_profile(&pool, "apis@test.com").await;

    let first = ApiConfigRepo::upsert(
        &pool,
        id,
        "openai",
        &UpsertApiConfiguration {
            credential: "sk-old-key".to_string(),
            is_enabled: None,
        },
    )
    .await
    .unwrap();
    assert!(first.is_enabled);

    let tested = ApiConfigRepo::record_test(&pool, first.id, "ok").await.unwrap();
    assert_eq!(tested.test_status.as_deref(), Some("ok"));
    assert!(tested.last_tested_at.is_some());

    let replaced = ApiConfigRepo::upsert(
        &pool,
        id,
        "openai",
        &UpsertApiConfiguration {
            credential: "sk-new-key".to_string(),
            is_enabled: Some(false),
        },
    )
    .await
    .unwrap();
    assert_eq!(replaced.id, first.id, "upsert must reuse the row");
    assert_eq!(replaced.credential, "sk-new-key");
    assert!(!replaced.is_enabled);
    assert!(replaced.test_status.is_none(), "new credential is untested");
    assert!(replaced.last_tested_at.is_none());
}

/// Disabled configurations are invisible to the dispatch lookup.
#[sqlx::test(migrations = "./migrations")]
async fn test_find_enabled_excludes_disabled(pool: PgPool) {
    let id = create_profile(&pool, "disabled@test.com").await;

    ApiConfigRepo::upsert(
        &pool,
        id,
        "luma",
        &UpsertApiConfiguration {
            credential: "luma-key".to_string(),
            is_enabled: Some(false),
        },
    )
    .await
    .unwrap();

    assert!(ApiConfigRepo::find(&pool, id, "luma").await.unwrap().is_some());
    assert!(ApiConfigRepo::find_enabled(&pool, id, "luma")
        .await
        .unwrap()
        .is_none());
}
