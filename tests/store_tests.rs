use chrono::{Duration, Utc};
use uuid::Uuid;

use jobnest::config::StoreConfig;
use jobnest::error::JobNestError;
use jobnest::store::{Job, JobPatch, JobStatus, JobStore, MemoryStore, NewJob, SortOrder};

fn new_job(company: &str, role: &str) -> NewJob {
    NewJob {
        company: company.to_string(),
        role: role.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_job_store_operations() {
    let store = MemoryStore::new();

    let acme = store.insert(new_job("Acme", "Engineer")).await.unwrap();
    let beta = store.insert(new_job("Beta", "Designer")).await.unwrap();
    assert_ne!(acme.id, beta.id);
    assert_eq!(store.count().await.unwrap(), 2);

    // Lookup
    let retrieved = store.find_by_id(&acme.id).await.unwrap().unwrap();
    assert_eq!(retrieved.company, "Acme");

    // Update
    let updated = store
        .find_by_id_and_update(
            &acme.id,
            JobPatch {
                status: Some(JobStatus::Interview),
                reminder: Some("Prepare system design".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, JobStatus::Interview);
    assert_eq!(updated.reminder.as_deref(), Some("Prepare system design"));
    assert_eq!(updated.applied_date, acme.applied_date);

    // Delete
    let deleted = store.find_by_id_and_delete(&beta.id).await.unwrap().unwrap();
    assert_eq!(deleted.id, beta.id);
    assert!(store.find_by_id(&beta.id).await.unwrap().is_none());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_rejects_blank_company() {
    let store = MemoryStore::new();

    let err = store.insert(new_job(" ", "Engineer")).await.unwrap_err();

    assert!(matches!(err, JobNestError::Validation(_)));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_can_move_applied_date() {
    let store = MemoryStore::new();
    let job = store.insert(new_job("Acme", "Engineer")).await.unwrap();
    let earlier = Utc::now() - Duration::days(14);

    let updated = store
        .find_by_id_and_update(
            &job.id,
            JobPatch {
                applied_date: Some(earlier),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.applied_date, earlier);
    assert_eq!(updated.status, job.status);
}

#[tokio::test]
async fn test_unknown_ids_are_not_failures() {
    let store = MemoryStore::new();
    store.insert(new_job("Acme", "Engineer")).await.unwrap();
    let missing = Uuid::new_v4();

    assert!(store.find_by_id(&missing).await.unwrap().is_none());
    assert!(store
        .find_by_id_and_update(
            &missing,
            JobPatch {
                status: Some(JobStatus::Offer),
                ..Default::default()
            }
        )
        .await
        .unwrap()
        .is_none());
    assert!(store.find_by_id_and_delete(&missing).await.unwrap().is_none());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default().with_data_file(dir.path().join("jobs.json"));

    let (kept, removed) = {
        let store = MemoryStore::open(&config).await.unwrap();
        let kept = store.insert(new_job("Acme", "Engineer")).await.unwrap();
        let removed = store.insert(new_job("Beta", "Designer")).await.unwrap();
        store
            .find_by_id_and_update(
                &kept.id,
                JobPatch {
                    status: Some(JobStatus::Offer),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.find_by_id_and_delete(&removed.id).await.unwrap();
        store.close().await.unwrap();
        (kept, removed)
    };

    let reopened = MemoryStore::open(&config).await.unwrap();
    let jobs = reopened.find_all(SortOrder::NewestFirst).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, kept.id);
    assert_eq!(jobs[0].status, JobStatus::Offer);
    assert!(reopened.find_by_id(&removed.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_snapshot_written_on_every_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    let config = StoreConfig::default().with_data_file(&path);

    let store = MemoryStore::open(&config).await.unwrap();
    let job = store.insert(new_job("Acme", "Engineer")).await.unwrap();

    let on_disk: Vec<Job> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, vec![job]);
}

#[tokio::test]
async fn test_snapshot_with_tmp_extension_is_replaced_whole() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.tmp");
    let config = StoreConfig::default().with_data_file(&path);

    let store = MemoryStore::open(&config).await.unwrap();
    let acme = store.insert(new_job("Acme", "Engineer")).await.unwrap();
    let beta = store.insert(new_job("Beta", "Designer")).await.unwrap();
    store.close().await.unwrap();

    let reopened = MemoryStore::open(&config).await.unwrap();
    let mut ids: Vec<Uuid> = reopened
        .find_all(SortOrder::NewestFirst)
        .await
        .unwrap()
        .into_iter()
        .map(|job| job.id)
        .collect();
    ids.sort();
    let mut expected = vec![acme.id, beta.id];
    expected.sort();
    assert_eq!(ids, expected);

    // Only the snapshot itself is left behind.
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("jobs.tmp")]);
}

#[tokio::test]
async fn test_open_without_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default().with_data_file(dir.path().join("missing.json"));

    let store = MemoryStore::open(&config).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 0);
    assert_eq!(store.data_file(), config.data_file.as_deref());
}

#[tokio::test]
async fn test_open_rejects_corrupt_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    std::fs::write(&path, b"not json").unwrap();

    let err = MemoryStore::open(&StoreConfig::default().with_data_file(&path))
        .await
        .unwrap_err();

    assert!(matches!(err, JobNestError::Store(_)));
}

#[tokio::test]
async fn test_capacity_from_config() {
    let store = MemoryStore::open(&StoreConfig::default().with_max_jobs(2))
        .await
        .unwrap();
    store.insert(new_job("A", "Engineer")).await.unwrap();
    store.insert(new_job("B", "Engineer")).await.unwrap();

    let err = store.insert(new_job("C", "Engineer")).await.unwrap_err();

    assert!(err.to_string().contains("capacity"));
}
