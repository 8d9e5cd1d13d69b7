use crate::entry::FileEntry;
use serde::Serialize;
use std::collections::HashMap;

/// Collision totals over the proposed names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateSummary {
    pub has_duplicates: bool,
    /// Distinct names used by more than one entry
    pub distinct_names: usize,
    /// Every entry sharing one of those names, not only the extra copies
    pub affected_files: usize,
}

/// Result of one detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    pub summary: DuplicateSummary,
    /// Storage indices whose `is_duplicate` flag flipped in this pass
    pub changed: Vec<usize>,
}

/// Flags every entry whose proposed full name is shared with another entry.
///
/// Names compare as exact, case-sensitive strings. Each call is a fresh pass
/// over the whole set since a single edit can create or break any collision.
pub fn detect(entries: &mut [FileEntry]) -> DuplicateReport {
    let names: Vec<String> = entries.iter().map(|e| e.proposed_full_name()).collect();

    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(names.len());
    for name in &names {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }

    let mut summary = DuplicateSummary::default();
    for &count in counts.values().filter(|&&c| c >= 2) {
        summary.distinct_names += 1;
        summary.affected_files += count;
    }
    summary.has_duplicates = summary.distinct_names > 0;

    let mut changed = Vec::new();
    for (index, (entry, name)) in entries.iter_mut().zip(&names).enumerate() {
        let duplicate = counts[name.as_str()] >= 2;
        if entry.is_duplicate != duplicate {
            entry.is_duplicate = duplicate;
            changed.push(index);
        }
    }

    if summary.has_duplicates {
        log::debug!(
            "{} duplicate name(s) affecting {} files",
            summary.distinct_names,
            summary.affected_files
        );
    }

    DuplicateReport { summary, changed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn entries(proposed: &[&str]) -> Vec<FileEntry> {
        proposed
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut entry = FileEntry::from_path(&Path::new("/data").join(format!("f{}.bin", i)));
                let (stem, ext) = crate::entry::split_name(name);
                entry.proposed_stem = stem;
                entry.proposed_extension = ext;
                entry
            })
            .collect()
    }

    #[test]
    fn test_no_duplicates() {
        let mut set = entries(&["a.txt", "b.txt", "c.txt"]);
        let report = detect(&mut set);

        assert!(!report.summary.has_duplicates);
        assert_eq!(report.summary.distinct_names, 0);
        assert_eq!(report.summary.affected_files, 0);
        assert!(report.changed.is_empty());
        assert!(set.iter().all(|e| !e.is_duplicate));
    }

    #[test]
    fn test_duplicates_flag_every_participant() {
        let mut set = entries(&["a.txt", "b.txt", "a.txt", "a.txt", "b.txt", "c.txt"]);
        let report = detect(&mut set);

        assert!(report.summary.has_duplicates);
        assert_eq!(report.summary.distinct_names, 2);
        assert_eq!(report.summary.affected_files, 5);

        let flags: Vec<bool> = set.iter().map(|e| e.is_duplicate).collect();
        assert_eq!(flags, vec![true, true, true, true, true, false]);
        assert_eq!(report.changed, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let mut set = entries(&["Photo.jpg", "photo.jpg", "photo.JPG"]);
        let report = detect(&mut set);

        assert!(!report.summary.has_duplicates);
    }

    #[test]
    fn test_changed_reports_only_flips() {
        let mut set = entries(&["a.txt", "a.txt", "b.txt"]);
        detect(&mut set);

        // Break the collision by editing the second entry
        set[1].proposed_stem = "z".to_string();
        let report = detect(&mut set);

        assert_eq!(report.changed, vec![0, 1]);
        assert!(!report.summary.has_duplicates);

        let again = detect(&mut set);
        assert!(again.changed.is_empty());
    }

    #[test]
    fn test_extensionless_name_does_not_collide_with_dotted() {
        let mut set = entries(&["readme", "readme.md"]);
        assert!(!detect(&mut set).summary.has_duplicates);
    }
}
