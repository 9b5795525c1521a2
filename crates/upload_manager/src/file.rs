//! Attached file types and the forward-only status lifecycle.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw file handed over by the picker: name, MIME type, raw bytes.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A transport-ready file: metadata plus base64 payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Base64-encoded payload.
    pub data: String,
}

impl From<IncomingFile> for FileDescriptor {
    fn from(file: IncomingFile) -> Self {
        let size_bytes = file.size_bytes();
        Self {
            name: file.name,
            mime_type: file.mime_type,
            size_bytes,
            data: STANDARD.encode(&file.bytes),
        }
    }
}

/// Lifecycle status of an attached file. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploading,
    Processing,
    Ready,
}

/// One attached file and its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEntry {
    pub id: Uuid,
    pub file: FileDescriptor,
    status: UploadStatus,
    /// 0-100; meaningful only while `Uploading`.
    progress: u8,
}

impl UploadEntry {
    pub fn new(file: FileDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            file,
            status: UploadStatus::Uploading,
            progress: 0,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_ready(&self) -> bool {
        self.status == UploadStatus::Ready
    }

    /// Raise progress toward 100. Ignored once the file has left `Uploading`;
    /// never decreases.
    pub fn set_progress(&mut self, percent: u8) {
        if self.status != UploadStatus::Uploading {
            return;
        }
        self.progress = self.progress.max(percent.min(100));
    }

    /// Move the status forward. Regressions are ignored, so the lifecycle
    /// invariant holds no matter how callers interleave.
    pub fn advance(&mut self, next: UploadStatus) {
        if next <= self.status {
            return;
        }
        if next > UploadStatus::Uploading {
            self.progress = 100;
        }
        self.status = next;
    }
}
