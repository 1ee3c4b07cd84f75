use chrono::{DateTime, Duration, TimeZone, Utc};

use linkvault_core::{Drop, DropContent, FileRef};

use crate::error::StoreError;
use crate::store::{DropStore, ViewOutcome};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Build a text drop expiring `ttl_minutes` after the suite's fixed epoch.
pub fn sample_text_drop(id: &str, ttl_minutes: i64) -> Drop {
    let created_at = epoch();
    Drop {
        id: id.to_owned(),
        delete_token: format!("{id}-delete-token-0000"),
        content: DropContent::Text {
            text: format!("content of {id}"),
        },
        password_hash: None,
        one_time_view: false,
        max_downloads: None,
        view_count: 0,
        created_at,
        expires_at: created_at + Duration::minutes(ttl_minutes),
    }
}

/// Build a file drop expiring `ttl_minutes` after the suite's fixed epoch.
pub fn sample_file_drop(id: &str, ttl_minutes: i64) -> Drop {
    let mut drop = sample_text_drop(id, ttl_minutes);
    drop.content = DropContent::File(FileRef {
        blob_id: format!("blob-{id}"),
        original_name: "notes.txt".to_owned(),
        mime_type: "text/plain".to_owned(),
        size_bytes: 11,
    });
    drop
}

/// Run the full drop store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if the backend fails an operation outright. Behavioural
/// mismatches panic via `assert!`.
pub async fn run_store_conformance_tests(store: &dyn DropStore) -> Result<(), StoreError> {
    test_find_missing(store).await?;
    test_insert_and_find(store).await?;
    test_insert_duplicate_id(store).await?;
    test_insert_duplicate_token(store).await?;
    test_save(store).await?;
    test_save_missing(store).await?;
    test_delete(store).await?;
    test_find_all_expired(store).await?;
    test_record_view(store).await?;
    test_record_view_limit(store).await?;
    test_record_view_one_time(store).await?;
    test_record_view_expired_and_missing(store).await?;
    Ok(())
}

async fn test_find_missing(store: &dyn DropStore) -> Result<(), StoreError> {
    let found = store.find_by_id("missing").await?;
    assert!(found.is_none(), "find_by_id on unknown id should return None");
    Ok(())
}

async fn test_insert_and_find(store: &dyn DropStore) -> Result<(), StoreError> {
    let drop = sample_file_drop("ins-find", 10);
    store.insert(&drop).await?;
    let found = store.find_by_id("ins-find").await?;
    assert_eq!(found.as_ref(), Some(&drop));
    Ok(())
}

async fn test_insert_duplicate_id(store: &dyn DropStore) -> Result<(), StoreError> {
    let drop = sample_text_drop("dup-id", 10);
    store.insert(&drop).await?;

    let mut clash = sample_text_drop("dup-id", 20);
    clash.delete_token = "another-delete-token-1".to_owned();
    let result = store.insert(&clash).await;
    assert!(
        matches!(result, Err(StoreError::UniqueViolation(_))),
        "duplicate id should be a unique violation, got {result:?}"
    );

    let found = store.find_by_id("dup-id").await?;
    assert_eq!(found.map(|d| d.expires_at), Some(drop.expires_at));
    Ok(())
}

async fn test_insert_duplicate_token(store: &dyn DropStore) -> Result<(), StoreError> {
    let drop = sample_text_drop("dup-tok-a", 10);
    store.insert(&drop).await?;

    let mut clash = sample_text_drop("dup-tok-b", 10);
    clash.delete_token.clone_from(&drop.delete_token);
    let result = store.insert(&clash).await;
    assert!(
        matches!(result, Err(StoreError::UniqueViolation(_))),
        "duplicate delete token should be a unique violation, got {result:?}"
    );
    assert!(store.find_by_id("dup-tok-b").await?.is_none());
    Ok(())
}

async fn test_save(store: &dyn DropStore) -> Result<(), StoreError> {
    let mut drop = sample_text_drop("save", 10);
    store.insert(&drop).await?;

    drop.view_count = 3;
    drop.expires_at = epoch();
    store.save(&drop).await?;

    let found = store.find_by_id("save").await?;
    let found = found.expect("saved drop should exist");
    assert_eq!(found.view_count, 3);
    assert_eq!(found.expires_at, epoch());
    Ok(())
}

async fn test_save_missing(store: &dyn DropStore) -> Result<(), StoreError> {
    let drop = sample_text_drop("save-missing", 10);
    let result = store.save(&drop).await;
    assert!(
        matches!(result, Err(StoreError::NotFound(_))),
        "save on unknown id should be NotFound, got {result:?}"
    );
    Ok(())
}

async fn test_delete(store: &dyn DropStore) -> Result<(), StoreError> {
    let drop = sample_text_drop("to-delete", 10);
    store.insert(&drop).await?;

    assert!(store.delete_by_id("to-delete").await?);
    assert!(store.find_by_id("to-delete").await?.is_none());
    assert!(
        !store.delete_by_id("to-delete").await?,
        "second delete should report nothing removed"
    );
    Ok(())
}

async fn test_find_all_expired(store: &dyn DropStore) -> Result<(), StoreError> {
    // Expiry relative to a point far in the future of the epoch so earlier
    // tests' drops do not interfere with the counts below.
    let base = epoch() + Duration::days(365);
    let mut past = sample_text_drop("exp-past", 0);
    past.expires_at = base - Duration::minutes(5);
    let mut boundary = sample_text_drop("exp-boundary", 0);
    boundary.expires_at = base;
    let mut future = sample_text_drop("exp-future", 0);
    future.expires_at = base + Duration::minutes(5);

    store.insert(&past).await?;
    store.insert(&boundary).await?;
    store.insert(&future).await?;

    let expired = store.find_all_expired(base).await?;
    let ids: Vec<&str> = expired.iter().map(|d| d.id.as_str()).collect();
    assert!(ids.contains(&"exp-past"));
    assert!(ids.contains(&"exp-boundary"));
    assert!(!ids.contains(&"exp-future"));

    for id in ["exp-past", "exp-boundary", "exp-future"] {
        store.delete_by_id(id).await?;
    }
    Ok(())
}

async fn test_record_view(store: &dyn DropStore) -> Result<(), StoreError> {
    let drop = sample_text_drop("view", 10);
    store.insert(&drop).await?;

    let outcome = store.record_view("view", epoch()).await?;
    assert_eq!(outcome, ViewOutcome::Recorded { view_count: 1 });
    let outcome = store.record_view("view", epoch()).await?;
    assert_eq!(outcome, ViewOutcome::Recorded { view_count: 2 });

    let found = store.find_by_id("view").await?.expect("drop should exist");
    assert_eq!(found.view_count, 2);
    assert_eq!(found.expires_at, drop.expires_at);
    Ok(())
}

async fn test_record_view_limit(store: &dyn DropStore) -> Result<(), StoreError> {
    let mut drop = sample_text_drop("view-limit", 10);
    drop.max_downloads = Some(2);
    store.insert(&drop).await?;

    assert_eq!(
        store.record_view("view-limit", epoch()).await?,
        ViewOutcome::Recorded { view_count: 1 }
    );
    assert_eq!(
        store.record_view("view-limit", epoch()).await?,
        ViewOutcome::Recorded { view_count: 2 }
    );
    assert_eq!(
        store.record_view("view-limit", epoch()).await?,
        ViewOutcome::Exhausted
    );

    let found = store
        .find_by_id("view-limit")
        .await?
        .expect("drop should exist");
    assert_eq!(found.view_count, 2, "exhausted view must not increment");
    Ok(())
}

async fn test_record_view_one_time(store: &dyn DropStore) -> Result<(), StoreError> {
    let mut drop = sample_text_drop("view-once", 10);
    drop.one_time_view = true;
    store.insert(&drop).await?;

    let now = epoch() + Duration::minutes(1);
    assert_eq!(
        store.record_view("view-once", now).await?,
        ViewOutcome::Recorded { view_count: 1 }
    );

    let found = store
        .find_by_id("view-once")
        .await?
        .expect("drop should exist");
    assert_eq!(found.expires_at, now, "one-time view collapses expiry");

    assert_eq!(
        store.record_view("view-once", now).await?,
        ViewOutcome::Expired
    );
    Ok(())
}

async fn test_record_view_expired_and_missing(store: &dyn DropStore) -> Result<(), StoreError> {
    let drop = sample_text_drop("view-expired", 10);
    store.insert(&drop).await?;

    let later = epoch() + Duration::minutes(10);
    assert_eq!(
        store.record_view("view-expired", later).await?,
        ViewOutcome::Expired
    );
    assert_eq!(
        store.record_view("view-nobody", later).await?,
        ViewOutcome::Missing
    );
    Ok(())
}
