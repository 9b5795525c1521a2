//! UploadPipeline - batch validation and the simulated ingestion timeline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use chat_core::{ChatConfig, MAX_FILES, MAX_FILE_SIZE_BYTES, MAX_FILE_SIZE_MB};

use crate::error::UploadError;
use crate::file::{FileDescriptor, IncomingFile, UploadEntry, UploadStatus};

/// Timing profile for the simulated lifecycle. Injected so tests can run the
/// pipeline under a paused clock.
#[derive(Debug, Clone, Copy)]
pub struct UploadTimings {
    /// Interval between progress increments while `Uploading`.
    pub progress_tick: Duration,
    /// Progress added per tick, in percent.
    pub progress_step: u8,
    /// Delay between `Processing` and `Ready`.
    pub settle: Duration,
}

impl Default for UploadTimings {
    fn default() -> Self {
        Self {
            progress_tick: Duration::from_millis(100),
            progress_step: 10,
            settle: Duration::from_millis(400),
        }
    }
}

/// A file skipped during batch intake, with a user-visible reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

/// Outcome of one `add_files` batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Ids of the entries that entered the pipeline.
    pub accepted: Vec<Uuid>,
    /// Per-file skips (oversized files). Never causes batch failure.
    pub skipped: Vec<SkippedFile>,
}

/// The attachment pipeline for one session.
///
/// Entries live behind a shared lock because the timeline driver tasks
/// advance them concurrently with UI reads.
#[derive(Clone)]
pub struct UploadPipeline {
    entries: Arc<RwLock<Vec<UploadEntry>>>,
    timings: UploadTimings,
    max_files: usize,
    max_file_size_bytes: u64,
}

impl Default for UploadPipeline {
    fn default() -> Self {
        Self::new(UploadTimings::default())
    }
}

impl UploadPipeline {
    pub fn new(timings: UploadTimings) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            timings,
            max_files: MAX_FILES,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
        }
    }

    pub fn from_config(config: &ChatConfig, timings: UploadTimings) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            timings,
            max_files: config.max_files,
            max_file_size_bytes: config.max_file_size_bytes,
        }
    }

    /// Validate and admit a batch of files.
    ///
    /// The whole batch is rejected when it would push the session over the
    /// attachment limit; individual oversized files are skipped with a
    /// recorded reason while the rest of the batch proceeds. Accepted files
    /// become visible atomically and then advance through the simulated
    /// lifecycle on their own timer tasks.
    pub async fn add_files(&self, batch: Vec<IncomingFile>) -> Result<BatchReport, UploadError> {
        let existing = self.entries.read().await.len();
        if existing + batch.len() > self.max_files {
            return Err(UploadError::TooManyFiles {
                max_files: self.max_files,
                existing,
                attempted: batch.len(),
            });
        }

        let mut accepted_entries = Vec::new();
        let mut skipped = Vec::new();
        for file in batch {
            if file.size_bytes() > self.max_file_size_bytes {
                tracing::warn!(name = %file.name, size = file.size_bytes(), "skipping oversized file");
                skipped.push(SkippedFile {
                    name: file.name.clone(),
                    reason: format!("{} exceeds the {} MB limit", file.name, MAX_FILE_SIZE_MB),
                });
                continue;
            }
            accepted_entries.push(UploadEntry::new(FileDescriptor::from(file)));
        }

        let accepted: Vec<Uuid> = accepted_entries.iter().map(|e| e.id).collect();
        {
            let mut entries = self.entries.write().await;
            entries.extend(accepted_entries);
        }

        for id in &accepted {
            tokio::spawn(drive_entry(
                Arc::clone(&self.entries),
                *id,
                self.timings,
            ));
        }

        Ok(BatchReport { accepted, skipped })
    }

    /// Remove one entry by index. Later entries shift down; nothing else
    /// changes.
    pub async fn remove_file(&self, index: usize) -> Result<UploadEntry, UploadError> {
        let mut entries = self.entries.write().await;
        if index >= entries.len() {
            return Err(UploadError::IndexOutOfRange { index });
        }
        Ok(entries.remove(index))
    }

    /// The files eligible for inclusion in a generation request.
    pub async fn ready_files(&self) -> Vec<FileDescriptor> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.is_ready())
            .map(|e| e.file.clone())
            .collect()
    }

    /// Snapshot of every entry, for display.
    pub async fn snapshot(&self) -> Vec<UploadEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Sign-out path: drop every attachment.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Advance one entry through the simulated lifecycle. Stops silently if the
/// entry was removed mid-flight.
async fn drive_entry(entries: Arc<RwLock<Vec<UploadEntry>>>, id: Uuid, timings: UploadTimings) {
    let step = timings.progress_step.max(1);
    loop {
        tokio::time::sleep(timings.progress_tick).await;
        let mut guard = entries.write().await;
        let Some(entry) = guard.iter_mut().find(|e| e.id == id) else {
            return;
        };
        let next = entry.progress().saturating_add(step);
        entry.set_progress(next);
        if entry.progress() >= 100 {
            entry.advance(UploadStatus::Processing);
            break;
        }
    }

    tokio::time::sleep(timings.settle).await;
    let mut guard = entries.write().await;
    if let Some(entry) = guard.iter_mut().find(|e| e.id == id) {
        entry.advance(UploadStatus::Ready);
    }
}
