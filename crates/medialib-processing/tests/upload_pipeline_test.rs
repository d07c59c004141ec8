mod helpers;

use helpers::{jpeg, pdf, recording_sink, BrokenThumbnailer, FlakyBlobStore, Harness};
use medialib_core::{AppError, FileKind, ValidationError};
use medialib_processing::{NoProgress, UploadFile, UploadMetadata, UploadOptions, UploadStatus};
use medialib_storage::BlobStore;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn empty_file_is_rejected_before_any_io() {
    let h = Harness::new(FlakyBlobStore::new());
    let (values, sink) = recording_sink();

    let err = h
        .pipeline
        .upload(
            UploadFile::new("empty.png", "image/png", Vec::new()),
            UploadMetadata::default(),
            sink,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ValidationError::EmptyFile)));
    assert_eq!(h.store.writes(), 0);
    assert_eq!(h.repository.creates(), 0);
    assert!(values.lock().unwrap().is_empty());
    assert!(h.view.is_empty());
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let options = UploadOptions {
        max_file_size: 10,
        ..UploadOptions::default()
    };
    let h = Harness::with(FlakyBlobStore::new(), Arc::new(BrokenThumbnailer), options);

    let err = h
        .pipeline
        .upload(jpeg("big.jpg", 11), UploadMetadata::default(), Arc::new(NoProgress))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::FileTooLarge { size: 11, max: 10 })
    ));
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn image_upload_reports_monotonic_progress() {
    let h = Harness::new(FlakyBlobStore::new());
    let (values, sink) = recording_sink();

    let record = h
        .pipeline
        .upload(jpeg("beach.jpg", 2 * 1024 * 1024), UploadMetadata::default(), sink)
        .await
        .unwrap();

    assert_eq!(record.title, "beach.jpg");
    assert_eq!(record.file_name, "beach.jpg");
    assert_eq!(record.file_kind, FileKind::Image);
    assert_eq!(record.file_size_bytes, 2 * 1024 * 1024);
    assert!(record.storage_key.starts_with("media/"));
    assert!(record.storage_key.ends_with(".jpg"));
    assert!(record
        .thumbnail_key
        .as_deref()
        .is_some_and(|k| k.starts_with("thumbnails/")));
    assert!(record.thumbnail_url.is_some());
    assert!(h.store.inner.exists(&record.storage_key).await.unwrap());

    let values = values.lock().unwrap().clone();
    assert_eq!(values.first(), Some(&0.0));
    assert_eq!(values.last(), Some(&1.0));
    assert_eq!(values.iter().filter(|v| **v == 1.0).count(), 1);
    assert!(values.len() > 2, "expected intermediate progress: {:?}", values);
    for pair in values.windows(2) {
        assert!(pair[0] <= pair[1], "progress went backwards: {:?}", values);
    }
    assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));

    // The new record leads the view
    assert_eq!(h.view.snapshot()[0].id, record.id);
}

#[tokio::test]
async fn coarse_backend_reports_start_and_finish_only() {
    let h = Harness::new(FlakyBlobStore::coarse());
    let (values, sink) = recording_sink();

    h.pipeline
        .upload(jpeg("a.jpg", 4096), UploadMetadata::default(), sink)
        .await
        .unwrap();

    assert_eq!(*values.lock().unwrap(), vec![0.0, 1.0]);
}

#[tokio::test]
async fn blob_write_failure_creates_no_record() {
    let h = Harness::new(FlakyBlobStore::new().failing_writes());
    let (values, sink) = recording_sink();

    let err = h
        .pipeline
        .upload(pdf("report.pdf"), UploadMetadata::default(), sink)
        .await
        .unwrap_err();

    assert_eq!(err.error_type(), "Storage");
    assert_eq!(h.repository.creates(), 0);
    assert!(h.view.is_empty());
    assert!(!values.lock().unwrap().contains(&1.0));
}

#[tokio::test]
async fn repository_failure_cleans_up_orphans() {
    let h = Harness::new(FlakyBlobStore::new());
    h.repository.fail_creates.store(true, Ordering::SeqCst);
    let (values, sink) = recording_sink();

    let err = h
        .pipeline
        .upload(jpeg("orphan.jpg", 1024), UploadMetadata::default(), sink)
        .await
        .unwrap_err();

    assert_eq!(err.error_type(), "Repository");
    assert_eq!(h.repository.creates(), 1);
    // Original and thumbnail were written, then removed
    assert_eq!(h.store.writes(), 2);
    assert!(h.store.inner.is_empty());
    assert!(h.view.is_empty());
    assert!(!values.lock().unwrap().contains(&1.0));
}

#[tokio::test]
async fn orphans_are_kept_when_cleanup_is_disabled() {
    let options = UploadOptions {
        cleanup_orphaned_blobs: false,
        ..UploadOptions::default()
    };
    let h = Harness::with(
        FlakyBlobStore::new(),
        Arc::new(medialib_processing::PassthroughThumbnailer),
        options,
    );
    h.repository.fail_creates.store(true, Ordering::SeqCst);

    let result = h
        .pipeline
        .upload(jpeg("orphan.jpg", 1024), UploadMetadata::default(), Arc::new(NoProgress))
        .await;

    assert!(result.is_err());
    assert_eq!(h.store.inner.len(), 2);
    assert_eq!(h.store.deletes(), 0);
}

#[tokio::test]
async fn non_images_get_no_thumbnail() {
    let h = Harness::new(FlakyBlobStore::new());

    let record = h
        .pipeline
        .upload(pdf("report.pdf"), UploadMetadata::titled("Q3 report"), Arc::new(NoProgress))
        .await
        .unwrap();

    assert_eq!(record.title, "Q3 report");
    assert_eq!(record.file_kind, FileKind::Document);
    assert!(record.thumbnail_key.is_none());
    assert!(record.thumbnail_url.is_none());
    assert_eq!(h.store.inner.len(), 1);
}

#[tokio::test]
async fn thumbnail_failure_does_not_fail_upload() {
    let h = Harness::with(
        FlakyBlobStore::new(),
        Arc::new(BrokenThumbnailer),
        UploadOptions::default(),
    );

    let record = h
        .pipeline
        .upload(jpeg("photo.jpg", 512), UploadMetadata::default(), Arc::new(NoProgress))
        .await
        .unwrap();

    assert!(record.thumbnail_key.is_none());
    assert_eq!(h.store.inner.len(), 1);
    assert_eq!(h.view.len(), 1);
}

#[tokio::test]
async fn metadata_is_normalized_and_labelled() {
    let options = UploadOptions {
        uploader_label: Some("studio".to_string()),
        ..UploadOptions::default()
    };
    let h = Harness::with(
        FlakyBlobStore::new(),
        Arc::new(medialib_processing::PassthroughThumbnailer),
        options,
    );

    let metadata = UploadMetadata {
        title: Some("  Harbour  ".to_string()),
        description: Some("   ".to_string()),
        tags: vec!["sea".to_string(), " sea ".to_string(), "Sea".to_string()],
        uploader_label: None,
    };
    let record = h
        .pipeline
        .upload(pdf("harbour.pdf"), metadata, Arc::new(NoProgress))
        .await
        .unwrap();

    assert_eq!(record.title, "Harbour");
    assert_eq!(record.description, None);
    assert_eq!(record.tags, vec!["sea".to_string(), "Sea".to_string()]);
    assert_eq!(record.uploader_label.as_deref(), Some("studio"));

    let override_label = UploadMetadata {
        uploader_label: Some("alex".to_string()),
        ..UploadMetadata::default()
    };
    let record = h
        .pipeline
        .upload(pdf("second.pdf"), override_label, Arc::new(NoProgress))
        .await
        .unwrap();
    assert_eq!(record.uploader_label.as_deref(), Some("alex"));
}

#[tokio::test]
async fn concurrent_uploads_lose_no_records() {
    let h = Harness::new(FlakyBlobStore::new());

    let uploads = (0..20).map(|i| {
        let pipeline = h.pipeline.clone();
        async move {
            pipeline
                .upload(
                    jpeg(&format!("batch-{:02}.jpg", i), 2048),
                    UploadMetadata::default(),
                    Arc::new(NoProgress),
                )
                .await
        }
    });
    let results = futures::future::join_all(uploads).await;

    let ids: HashSet<_> = results.into_iter().map(|r| r.unwrap().id).collect();
    assert_eq!(ids.len(), 20);
    assert_eq!(h.view.len(), 20);
    assert_eq!(h.repository.inner.len(), 20);
    assert!(h.view.snapshot().iter().all(|r| ids.contains(&r.id)));
}

#[tokio::test]
async fn spawned_upload_publishes_status() {
    let h = Harness::new(FlakyBlobStore::new());

    let handle = h.pipeline.spawn(jpeg("spawned.jpg", 4096), UploadMetadata::default());
    let mut updates = handle.subscribe();
    let record = handle.wait().await.unwrap();

    let task = updates.borrow_and_update().clone();
    assert_eq!(task.status, UploadStatus::Succeeded);
    assert_eq!(task.progress, 1.0);
    assert_eq!(task.file_name, "spawned.jpg");
    assert_eq!(task.record.map(|r| r.id), Some(record.id));
}

#[tokio::test]
async fn spawned_upload_failure_is_reported() {
    let h = Harness::new(FlakyBlobStore::new().failing_writes());

    let handle = h.pipeline.spawn(pdf("doc.pdf"), UploadMetadata::default());
    let updates = handle.subscribe();
    let err = handle.wait().await.unwrap_err();

    assert_eq!(err.error_type(), "Storage");
    let task = updates.borrow().clone();
    assert_eq!(task.status, UploadStatus::Failed);
    assert!(task.error.is_some());
}

#[tokio::test]
async fn dropped_handle_still_completes() {
    let h = Harness::new(FlakyBlobStore::new());

    drop(h.pipeline.spawn(pdf("background.pdf"), UploadMetadata::default()));

    let mut waited = Duration::ZERO;
    while h.view.is_empty() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += Duration::from_millis(10);
    }
    assert_eq!(h.view.len(), 1);
    assert_eq!(h.repository.inner.len(), 1);
}
