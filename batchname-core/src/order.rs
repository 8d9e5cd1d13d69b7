use crate::entry::FileEntry;

/// Column the presentation layer can sort its view by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    OriginalName,
    ProposedStem,
    ProposedExtension,
    ProposedName,
}

impl SortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::OriginalName => "Original name",
            SortColumn::ProposedStem => "New filename",
            SortColumn::ProposedExtension => "New extension",
            SortColumn::ProposedName => "Preview",
        }
    }

    fn key(&self, entry: &FileEntry) -> String {
        match self {
            SortColumn::OriginalName => entry.original_full_name(),
            SortColumn::ProposedStem => entry.proposed_stem.clone(),
            SortColumn::ProposedExtension => entry.proposed_extension.clone(),
            SortColumn::ProposedName => entry.proposed_full_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// Permutation of storage indices in the order the entries are displayed.
///
/// Counters are numbered along this order while the entries themselves stay in
/// load order, which is also the order the executor renames them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingOrder {
    indices: Vec<usize>,
}

impl WorkingOrder {
    /// Load order
    pub fn identity(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    /// Stable sort of the entries by a display column
    pub fn sorted(entries: &[FileEntry], column: SortColumn, direction: SortDirection) -> Self {
        let keys: Vec<String> = entries.iter().map(|e| column.key(e)).collect();
        let mut indices: Vec<usize> = (0..entries.len()).collect();

        indices.sort_by(|&a, &b| {
            let ord = keys[a].cmp(&keys[b]);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        Self { indices }
    }

    /// Use an ordering supplied by the caller; it must be a permutation of `0..len`
    pub fn from_indices(indices: Vec<usize>, len: usize) -> Option<Self> {
        if indices.len() != len {
            return None;
        }
        let mut seen = vec![false; len];
        for &i in &indices {
            if i >= len || seen[i] {
                return None;
            }
            seen[i] = true;
        }
        Some(Self { indices })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Storage indices in working order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn load(names: &[&str]) -> Vec<FileEntry> {
        names
            .iter()
            .map(|n| FileEntry::from_path(&Path::new("/tmp/x").join(n)))
            .collect()
    }

    #[test]
    fn test_identity() {
        let order = WorkingOrder::identity(3);
        assert_eq!(order.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(WorkingOrder::identity(0).is_empty());
    }

    #[test]
    fn test_sorted_by_original_name() {
        let entries = load(&["c.txt", "a.txt", "b.txt"]);

        let asc = WorkingOrder::sorted(&entries, SortColumn::OriginalName, SortDirection::Ascending);
        assert_eq!(asc.iter().collect::<Vec<_>>(), vec![1, 2, 0]);

        let desc =
            WorkingOrder::sorted(&entries, SortColumn::OriginalName, SortDirection::Descending);
        assert_eq!(desc.iter().collect::<Vec<_>>(), vec![0, 2, 1]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let entries = load(&["b.jpg", "a.png", "c.jpg", "d.png"]);
        let order =
            WorkingOrder::sorted(&entries, SortColumn::ProposedExtension, SortDirection::Ascending);

        assert_eq!(order.iter().collect::<Vec<_>>(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_from_indices_rejects_non_permutations() {
        assert!(WorkingOrder::from_indices(vec![2, 0, 1], 3).is_some());
        assert!(WorkingOrder::from_indices(vec![0, 0, 1], 3).is_none());
        assert!(WorkingOrder::from_indices(vec![0, 1], 3).is_none());
        assert!(WorkingOrder::from_indices(vec![0, 1, 3], 3).is_none());
    }
}
