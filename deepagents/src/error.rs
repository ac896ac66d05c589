//! Backend error types.
//!
//! Returned by every [`Backend`](crate::backends::Backend) operation. The `Display` form of each
//! variant is the text an agent sees as tool output, so messages are written for an LLM reader:
//! most start with `Error:`, pattern problems start with `Invalid`.

use thiserror::Error;

use crate::memory::StoreError;

/// Backend operation error.
///
/// Expected outcomes an agent must react to (missing file, ambiguous edit, bad regex) and
/// storage failures share one type; the tool layer renders all of them as text.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Path does not name an existing file.
    #[error("Error: File '{0}' not found")]
    FileNotFound(String),

    /// `write` refuses to replace an existing file.
    #[error(
        "Cannot write to {0} because it already exists. Read and then make an edit, or write to a new path."
    )]
    AlreadyExists(String),

    /// Read offset is at or past the last line.
    #[error("Error: Line offset {offset} exceeds file length ({len} lines)")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// `edit` target string does not occur in the file.
    #[error("Error: String not found in file: '{0}'")]
    StringNotFound(String),

    /// `edit` target occurs more than once and `replace_all` was not set.
    #[error(
        "Error: String '{old}' appears {count} times in file. Use replace_all=true to replace all instances, or provide a more specific string with surrounding context."
    )]
    AmbiguousReplacement { old: String, count: usize },

    /// `edit` called with an empty target string.
    #[error("Error: old_string cannot be empty")]
    EmptyOldString,

    /// Path is empty or otherwise unusable.
    #[error("Error: Invalid path: {0}")]
    InvalidPath(String),

    /// Path resolves outside the backend's root directory.
    #[error("Error: Path escapes root: {0}")]
    PathEscapesRoot(String),

    /// Composite router has no mount (and no default) for the path.
    #[error("Error: No such path: '{0}' is not under any mount")]
    NoMount(String),

    /// Grep pattern failed to compile.
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    /// Glob pattern failed to compile.
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Persistent store failure.
    #[error("Error: storage failure: {0}")]
    Storage(#[from] StoreError),

    /// Filesystem I/O failure.
    #[error("Error: I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be decoded as file data.
    #[error("Error: malformed file data: {0}")]
    Serialization(String),
}

impl BackendError {
    /// True for storage-layer failures (store or disk) as opposed to bad input or not-found.
    ///
    /// The tool layer logs these before turning them into text.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            BackendError::Storage(_) | BackendError::Io(_) | BackendError::Serialization(_)
        )
    }
}

/// Backend result type.
pub type BackendResult<T> = Result<T, BackendError>;
