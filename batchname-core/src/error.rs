//! Error types for planning and executing renames
//!
//! Planning errors are returned as values and never abort the process; the
//! caller decides whether to surface them. Execution errors end the running job
//! and arrive as one terminal failure.

use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

/// Errors raised while computing previews or validating a commit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A counter text field is not a usable integer
    #[error("Invalid number input in {field}: {value:?}")]
    InvalidNumberInput { field: &'static str, value: String },

    /// Two or more entries share a proposed name
    #[error("Found {distinct} duplicate name(s) affecting {affected} files!")]
    DuplicateNames { distinct: usize, affected: usize },

    /// Commit attempted with nothing loaded
    #[error("No files to rename")]
    EmptyInput,

    /// A rename job is already running
    #[error("Renaming already in progress")]
    RenameInProgress,

    /// A proposed name that cannot name a file in the same directory
    #[error("Invalid file name {name:?}")]
    InvalidName { index: usize, name: String },

    /// A caller-supplied working order that is not a permutation of the entries
    #[error("Working order does not match the {0} loaded files")]
    InvalidOrder(usize),

    /// Edit addressed an entry that does not exist
    #[error("No entry at index {0}")]
    NoSuchEntry(usize),
}

/// Category of a filesystem failure during execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Permission,
    AlreadyExists,
    OtherIo,
}

impl FailureKind {
    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => FailureKind::Permission,
            io::ErrorKind::AlreadyExists => FailureKind::AlreadyExists,
            _ => FailureKind::OtherIo,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Permission => write!(f, "Permission denied"),
            FailureKind::AlreadyExists => write!(f, "File already exists"),
            FailureKind::OtherIo => write!(f, "Error"),
        }
    }
}

/// Terminal failure of a rename job
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}: {message}")]
pub struct RenameFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Pass that failed (1 = temporary names, 2 = final names)
    pub pass: u8,
    /// Files renamed in the failing pass before the error
    pub completed: usize,
}
