//! upload_manager - File attachment ingestion for the AgenticOne chat engine
//!
//! Validates and encodes user-attached files into a transport-ready form and
//! drives each accepted file through a simulated `Uploading -> Processing ->
//! Ready` lifecycle. No real server upload happens here; the lifecycle exists
//! to drive UI affordance, and only `Ready` files are eligible for inclusion
//! in a generation request.

mod error;
mod file;
mod pipeline;

pub use error::UploadError;
pub use file::{FileDescriptor, IncomingFile, UploadEntry, UploadStatus};
pub use pipeline::{BatchReport, SkippedFile, UploadPipeline, UploadTimings};
