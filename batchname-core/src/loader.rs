use crate::entry::FileEntry;
use log::warn;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Entries built from a list of input paths
#[derive(Debug, Default)]
pub struct LoadedFiles {
    pub entries: Vec<FileEntry>,
    /// Inputs that were missing, directories, repeated, or not valid UTF-8
    pub skipped: Vec<PathBuf>,
}

/// Builds one entry per existing regular file, keeping input order.
///
/// Directories and missing paths are skipped. A path given twice is loaded
/// once, since two entries must never own the same file. File names that are
/// not valid UTF-8 are skipped because they could not be renamed back to
/// themselves.
pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> LoadedFiles {
    let mut loaded = LoadedFiles::default();
    let mut seen = HashSet::new();

    for path in paths {
        let path = path.as_ref();

        if !path.is_file() {
            warn!("Skipping {}: not an existing file", path.display());
            loaded.skipped.push(path.to_path_buf());
            continue;
        }

        if path.file_name().and_then(|name| name.to_str()).is_none() {
            warn!("Skipping {}: file name is not valid UTF-8", path.display());
            loaded.skipped.push(path.to_path_buf());
            continue;
        }

        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(key) {
            warn!("Skipping {}: already loaded", path.display());
            loaded.skipped.push(path.to_path_buf());
            continue;
        }

        loaded.entries.push(FileEntry::from_path(path));
    }

    loaded
}
