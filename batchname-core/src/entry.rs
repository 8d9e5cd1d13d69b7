use serde::Serialize;
use std::path::{Path, PathBuf};

/// One file under management
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Current location on disk (reassigned after every confirmed rename step)
    pub path: PathBuf,
    /// Stem captured at load time
    pub original_stem: String,
    /// Extension captured at load time, without the dot
    pub original_extension: String,
    /// Stem of the name the file currently has on disk
    pub current_stem: String,
    /// Extension of the name the file currently has on disk
    pub current_extension: String,
    /// Target stem
    pub proposed_stem: String,
    /// Target extension
    pub proposed_extension: String,
    /// Set by the duplicate detector only
    pub is_duplicate: bool,
}

impl FileEntry {
    /// Create an entry for a file, every name field starts as the file's own name
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let (stem, extension) = split_name(&name);

        Self {
            path: path.to_path_buf(),
            original_stem: stem.clone(),
            original_extension: extension.clone(),
            current_stem: stem.clone(),
            current_extension: extension.clone(),
            proposed_stem: stem,
            proposed_extension: extension,
            is_duplicate: false,
        }
    }

    pub fn original_full_name(&self) -> String {
        join_name(&self.original_stem, &self.original_extension)
    }

    pub fn current_full_name(&self) -> String {
        join_name(&self.current_stem, &self.current_extension)
    }

    pub fn proposed_full_name(&self) -> String {
        join_name(&self.proposed_stem, &self.proposed_extension)
    }

    /// Record that the file now lives at `path`
    pub(crate) fn moved_to(&mut self, path: PathBuf) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let (stem, extension) = split_name(&name);
        self.current_stem = stem;
        self.current_extension = extension;
        self.path = path;
    }
}

/// Joins a stem and an extension, leaving the dot out when there is no extension
pub fn join_name(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Splits a file name at its last dot.
///
/// A leading dot (`.bashrc`) or a trailing dot (`notes.`) does not start an
/// extension, so both return an empty extension.
pub fn split_name(name: &str) -> (String, String) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => {
            (name[..pos].to_string(), name[pos + 1..].to_string())
        }
        _ => (name.to_string(), String::new()),
    }
}

/// What the presentation layer shows for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    /// Position of the entry in storage (load) order
    pub index: usize,
    pub original_name: String,
    pub proposed_stem: String,
    pub proposed_extension: String,
    pub proposed_name: String,
    pub is_duplicate: bool,
}

impl PreviewRow {
    pub fn new(index: usize, entry: &FileEntry) -> Self {
        Self {
            index,
            original_name: entry.original_full_name(),
            proposed_stem: entry.proposed_stem.clone(),
            proposed_extension: entry.proposed_extension.clone(),
            proposed_name: entry.proposed_full_name(),
            is_duplicate: entry.is_duplicate,
        }
    }
}
