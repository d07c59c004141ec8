//! Background upload tasks.
//!
//! [`UploadPipeline::spawn`](super::pipeline::UploadPipeline::spawn) runs an upload on the
//! tokio runtime and returns an [`UploadHandle`]. The handle publishes [`UploadTask`]
//! snapshots through a `watch` channel. Dropping it does not cancel the upload.

use medialib_core::{AppError, MediaRecord};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Succeeded,
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Succeeded | UploadStatus::Failed)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid upload transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: UploadStatus,
    pub to: UploadStatus,
}

/// Observable state of one upload
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub file_name: String,
    pub status: UploadStatus,
    pub progress: f64,
    pub record: Option<MediaRecord>,
    pub error: Option<String>,
}

impl UploadTask {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            status: UploadStatus::Pending,
            progress: 0.0,
            record: None,
            error: None,
        }
    }

    fn transition(&mut self, to: UploadStatus) -> Result<(), InvalidTransition> {
        let allowed = matches!(
            (self.status, to),
            (UploadStatus::Pending, UploadStatus::Uploading)
                | (UploadStatus::Pending | UploadStatus::Uploading, UploadStatus::Failed)
                | (UploadStatus::Uploading, UploadStatus::Succeeded)
        );
        if !allowed {
            return Err(InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn begin(&mut self) -> Result<(), InvalidTransition> {
        self.transition(UploadStatus::Uploading)
    }

    /// Record progress while uploading; never moves backwards
    pub fn set_progress(&mut self, progress: f64) {
        if self.status == UploadStatus::Uploading && progress > self.progress {
            self.progress = progress.min(1.0);
        }
    }

    pub fn succeed(&mut self, record: MediaRecord) -> Result<(), InvalidTransition> {
        self.transition(UploadStatus::Succeeded)?;
        self.progress = 1.0;
        self.record = Some(record);
        Ok(())
    }

    pub fn fail(&mut self, error: &AppError) -> Result<(), InvalidTransition> {
        self.transition(UploadStatus::Failed)?;
        self.error = Some(error.to_string());
        Ok(())
    }
}

/// Handle to a spawned upload
pub struct UploadHandle {
    pub(crate) receiver: watch::Receiver<UploadTask>,
    pub(crate) join: JoinHandle<Result<MediaRecord, AppError>>,
}

impl UploadHandle {
    /// Latest published state
    pub fn snapshot(&self) -> UploadTask {
        self.receiver.borrow().clone()
    }

    /// Independent receiver for state changes
    pub fn subscribe(&self) -> watch::Receiver<UploadTask> {
        self.receiver.clone()
    }

    /// Wait for the upload to finish
    pub async fn wait(self) -> Result<MediaRecord, AppError> {
        self.join
            .await
            .map_err(|e| AppError::Internal(format!("Upload task failed: {}", e)))?
    }
}
