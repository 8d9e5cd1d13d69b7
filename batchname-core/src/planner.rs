use crate::composer::compose;
use crate::duplicates::{detect, DuplicateReport, DuplicateSummary};
use crate::entry::FileEntry;
use crate::error::PlanError;
use crate::executor::TEMP_PREFIX;
use crate::order::WorkingOrder;
use crate::settings::RenameSettings;

/// Entries with their proposed names and the collision totals over them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    entries: Vec<FileEntry>,
    duplicates: DuplicateSummary,
}

impl RenamePlan {
    /// Wrap entries as loaded, proposing their current names
    pub fn new(mut entries: Vec<FileEntry>) -> Self {
        let duplicates = detect(&mut entries).summary;
        Self {
            entries,
            duplicates,
        }
    }

    /// Entries in storage order
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn duplicates(&self) -> DuplicateSummary {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [FileEntry] {
        &mut self.entries
    }

    pub(crate) fn replace_entries(&mut self, entries: Vec<FileEntry>) {
        self.entries = entries;
        self.duplicates = detect(&mut self.entries).summary;
    }
}

/// Manual override of one entry's proposed name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEdit {
    Stem(String),
    Extension(String),
}

/// Recompose every entry along `order` and run a duplicate pass.
///
/// Counters restart from their start value on every call.
pub fn build_preview(
    mut entries: Vec<FileEntry>,
    settings: &RenameSettings,
    order: &WorkingOrder,
) -> RenamePlan {
    compose_all(&mut entries, settings, order);
    let duplicates = detect(&mut entries).summary;
    RenamePlan {
        entries,
        duplicates,
    }
}

/// In-place variant of [`build_preview`] that also reports which rows flipped
pub fn refresh_preview(
    plan: &mut RenamePlan,
    settings: &RenameSettings,
    order: &WorkingOrder,
) -> DuplicateReport {
    compose_all(&mut plan.entries, settings, order);
    let report = detect(&mut plan.entries);
    plan.duplicates = report.summary;
    log::debug!("Recomputed previews for {} files", plan.entries.len());
    report
}

/// Sets one entry's proposed stem or extension directly, then re-checks the
/// whole set for collisions
pub fn apply_edit(
    plan: &mut RenamePlan,
    index: usize,
    edit: EntryEdit,
) -> Result<DuplicateReport, PlanError> {
    let entry = plan
        .entries
        .get_mut(index)
        .ok_or(PlanError::NoSuchEntry(index))?;

    match edit {
        EntryEdit::Stem(stem) => entry.proposed_stem = stem,
        EntryEdit::Extension(extension) => entry.proposed_extension = extension,
    }

    let report = detect(&mut plan.entries);
    plan.duplicates = report.summary;
    Ok(report)
}

/// A duplicate-free, non-empty snapshot of a plan; the only input the executor accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    entries: Vec<FileEntry>,
}

impl CommitPlan {
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }
}

/// Checks a plan can be committed and takes a deep copy of its entries
pub fn validate_for_commit(plan: &RenamePlan) -> Result<CommitPlan, PlanError> {
    if plan.entries.is_empty() {
        return Err(PlanError::EmptyInput);
    }

    if plan.duplicates.has_duplicates {
        return Err(PlanError::DuplicateNames {
            distinct: plan.duplicates.distinct_names,
            affected: plan.duplicates.affected_files,
        });
    }

    if let Some((index, entry)) = plan
        .entries
        .iter()
        .enumerate()
        .find(|(_, e)| !is_valid_file_name(&e.proposed_full_name()))
    {
        return Err(PlanError::InvalidName {
            index,
            name: entry.proposed_full_name(),
        });
    }

    Ok(CommitPlan {
        entries: plan.entries.clone(),
    })
}

/// A name must stay inside its directory: no separators, not empty, not `.` or `..`.
/// Names in the temp namespace are reserved for the first rename pass.
fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(TEMP_PREFIX)
        && name != "."
        && name != ".."
        && !name.contains('\0')
        && !name.chars().any(std::path::is_separator)
}

fn compose_all(entries: &mut [FileEntry], settings: &RenameSettings, order: &WorkingOrder) {
    for (ordinal, index) in order.iter().enumerate() {
        if let Some(entry) = entries.get_mut(index) {
            let (stem, extension) = compose(entry, settings, ordinal);
            entry.proposed_stem = stem;
            entry.proposed_extension = extension;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{SortColumn, SortDirection};
    use crate::settings::Counter;
    use std::path::Path;

    fn load(names: &[&str]) -> Vec<FileEntry> {
        names
            .iter()
            .map(|n| FileEntry::from_path(&Path::new("/photos").join(n)))
            .collect()
    }

    fn counter_settings() -> RenameSettings {
        RenameSettings {
            filename_mask: "vacation".to_string(),
            keep_original_filename: false,
            filename_counter: Some(Counter::new(1, 1, 2)),
            ..RenameSettings::default()
        }
    }

    fn proposed(plan: &RenamePlan) -> Vec<String> {
        plan.entries().iter().map(|e| e.proposed_full_name()).collect()
    }

    #[test]
    fn test_keep_originals_is_identity() {
        let entries = load(&["img1.jpg", "notes.txt", "Makefile"]);
        let order = WorkingOrder::identity(entries.len());
        let plan = build_preview(entries, &RenameSettings::default(), &order);

        for entry in plan.entries() {
            assert_eq!(entry.proposed_full_name(), entry.original_full_name());
        }
        assert!(!plan.duplicates().has_duplicates);
    }

    #[test]
    fn test_preview_with_counter() {
        let entries = load(&["img1.jpg", "img2.jpg"]);
        let order = WorkingOrder::identity(entries.len());
        let plan = build_preview(entries, &counter_settings(), &order);

        assert_eq!(proposed(&plan), vec!["vacation01.jpg", "vacation02.jpg"]);
    }

    #[test]
    fn test_preview_is_deterministic() {
        let entries = load(&["a.jpg", "b.jpg", "c.jpg"]);
        let order = WorkingOrder::identity(entries.len());
        let settings = counter_settings();

        let first = build_preview(entries, &settings, &order);
        let second = build_preview(first.entries().to_vec(), &settings, &order);

        assert_eq!(proposed(&first), proposed(&second));
    }

    #[test]
    fn test_counters_follow_working_order() {
        let entries = load(&["c.jpg", "a.jpg", "b.jpg"]);
        let order =
            WorkingOrder::sorted(&entries, SortColumn::OriginalName, SortDirection::Ascending);
        let plan = build_preview(entries, &counter_settings(), &order);

        // Storage order is untouched, numbering follows the sorted view
        assert_eq!(
            proposed(&plan),
            vec!["vacation03.jpg", "vacation01.jpg", "vacation02.jpg"]
        );
    }

    #[test]
    fn test_mask_without_counter_creates_duplicates() {
        let entries = load(&["a.jpg", "b.jpg", "c.png"]);
        let order = WorkingOrder::identity(entries.len());
        let settings = RenameSettings {
            filename_mask: "same".to_string(),
            keep_original_filename: false,
            ..RenameSettings::default()
        };
        let plan = build_preview(entries, &settings, &order);

        let summary = plan.duplicates();
        assert!(summary.has_duplicates);
        assert_eq!(summary.distinct_names, 1);
        assert_eq!(summary.affected_files, 2);
    }

    #[test]
    fn test_validate_for_commit() {
        assert_eq!(
            validate_for_commit(&RenamePlan::default()),
            Err(PlanError::EmptyInput)
        );

        let entries = load(&["a.jpg", "b.jpg"]);
        let order = WorkingOrder::identity(2);
        let settings = RenameSettings {
            filename_mask: "same".to_string(),
            keep_original_filename: false,
            ..RenameSettings::default()
        };
        let clashing = build_preview(entries.clone(), &settings, &order);
        assert_eq!(
            validate_for_commit(&clashing),
            Err(PlanError::DuplicateNames {
                distinct: 1,
                affected: 2
            })
        );

        let fine = build_preview(entries, &counter_settings(), &order);
        let commit = validate_for_commit(&fine).unwrap();
        assert_eq!(commit.len(), 2);
        assert_eq!(commit.entries(), fine.entries());
    }

    #[test]
    fn test_names_leaving_the_directory_are_rejected() {
        let mut plan = RenamePlan::new(load(&["a.jpg", "b.jpg"]));
        apply_edit(&mut plan, 1, EntryEdit::Stem("../b".to_string())).unwrap();

        assert_eq!(
            validate_for_commit(&plan),
            Err(PlanError::InvalidName {
                index: 1,
                name: "../b.jpg".to_string()
            })
        );

        apply_edit(&mut plan, 1, EntryEdit::Stem(String::new())).unwrap();
        apply_edit(&mut plan, 1, EntryEdit::Extension(String::new())).unwrap();
        assert!(matches!(
            validate_for_commit(&plan),
            Err(PlanError::InvalidName { index: 1, .. })
        ));
    }

    #[test]
    fn test_names_in_temp_namespace_are_rejected() {
        let mut plan = RenamePlan::new(load(&["a.txt", "b.txt"]));
        let reserved = format!("{}x", TEMP_PREFIX);
        apply_edit(&mut plan, 0, EntryEdit::Stem(reserved.clone())).unwrap();
        apply_edit(&mut plan, 1, EntryEdit::Stem("x".to_string())).unwrap();

        assert!(!plan.duplicates().has_duplicates);
        assert_eq!(
            validate_for_commit(&plan),
            Err(PlanError::InvalidName {
                index: 0,
                name: format!("{}.txt", reserved)
            })
        );
    }

    #[test]
    fn test_manual_edit_bypasses_composer_and_rechecks() {
        let entries = load(&["a.jpg", "b.jpg"]);
        let mut plan = RenamePlan::new(entries);

        let report = apply_edit(&mut plan, 1, EntryEdit::Stem("a".to_string())).unwrap();
        assert!(report.summary.has_duplicates);
        assert_eq!(report.changed, vec![0, 1]);

        let report = apply_edit(&mut plan, 1, EntryEdit::Extension("png".to_string())).unwrap();
        assert!(!report.summary.has_duplicates);
        assert_eq!(plan.entries()[1].proposed_full_name(), "a.png");

        assert_eq!(
            apply_edit(&mut plan, 5, EntryEdit::Stem("x".to_string())),
            Err(PlanError::NoSuchEntry(5))
        );
    }

    #[test]
    fn test_refresh_overwrites_manual_edits() {
        let mut plan = RenamePlan::new(load(&["a.jpg", "b.jpg"]));
        apply_edit(&mut plan, 0, EntryEdit::Stem("custom".to_string())).unwrap();

        let order = WorkingOrder::identity(plan.len());
        refresh_preview(&mut plan, &RenameSettings::default(), &order);

        assert_eq!(plan.entries()[0].proposed_full_name(), "a.jpg");
    }
}
