//! Upload error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error(
        "cannot attach {attempted} file(s): {existing} already attached, limit is {max_files}"
    )]
    TooManyFiles {
        max_files: usize,
        existing: usize,
        attempted: usize,
    },

    #[error("no attached file at index {index}")]
    IndexOutOfRange { index: usize },
}
