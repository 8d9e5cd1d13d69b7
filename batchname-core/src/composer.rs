use crate::entry::FileEntry;
use crate::settings::{Counter, RenameSettings};

/// Computes the proposed stem and extension for one entry.
///
/// `ordinal` is the entry's position in the working order, not a stable id:
/// re-sorting the view changes the counter value a file receives.
pub fn compose(entry: &FileEntry, settings: &RenameSettings, ordinal: usize) -> (String, String) {
    let stem = compose_part(
        &entry.original_stem,
        &settings.filename_mask,
        settings.keep_original_filename,
        settings.filename_counter.as_ref(),
        ordinal,
    );
    let extension = compose_part(
        &entry.original_extension,
        &settings.extension_mask,
        settings.keep_original_extension,
        settings.extension_counter.as_ref(),
        ordinal,
    );

    (stem, extension)
}

fn compose_part(
    original: &str,
    mask: &str,
    keep_original: bool,
    counter: Option<&Counter>,
    ordinal: usize,
) -> String {
    if keep_original {
        return original.to_string();
    }

    match counter {
        Some(counter) => format!(
            "{}{}",
            mask,
            zero_pad(counter.value_at(ordinal), counter.zero_fill)
        ),
        None => mask.to_string(),
    }
}

/// Left-pads the decimal form of `value` with zeros to at least `width`
/// characters. Longer values are never truncated; a minus sign stays in front
/// of the padding.
pub fn zero_pad(value: i64, width: usize) -> String {
    if value < 0 {
        let digits = value.unsigned_abs().to_string();
        format!("-{:0>width$}", digits, width = width.saturating_sub(1))
    } else {
        format!("{:0>width$}", value, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn entry(name: &str) -> FileEntry {
        FileEntry::from_path(&Path::new("/photos").join(name))
    }

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad(7, 3), "007");
        assert_eq!(zero_pad(12345, 3), "12345");
        assert_eq!(zero_pad(0, 1), "0");
        assert_eq!(zero_pad(-5, 3), "-05");
        assert_eq!(zero_pad(-123, 2), "-123");
    }

    #[test]
    fn test_keep_originals_returns_original_name() {
        let settings = RenameSettings::default();
        let file = entry("img1.jpg");

        assert_eq!(
            compose(&file, &settings, 4),
            ("img1".to_string(), "jpg".to_string())
        );
    }

    #[test]
    fn test_mask_with_counter() {
        let settings = RenameSettings {
            filename_mask: "vacation".to_string(),
            keep_original_filename: false,
            filename_counter: Some(Counter::new(1, 1, 2)),
            ..RenameSettings::default()
        };
        let file = entry("img1.jpg");

        assert_eq!(compose(&file, &settings, 0).0, "vacation01");
        assert_eq!(compose(&file, &settings, 1).0, "vacation02");
        assert_eq!(compose(&file, &settings, 99).0, "vacation100");
    }

    #[test]
    fn test_counter_ignored_when_keeping_original() {
        let settings = RenameSettings {
            filename_mask: "ignored".to_string(),
            keep_original_filename: true,
            filename_counter: Some(Counter::new(1, 1, 3)),
            ..RenameSettings::default()
        };

        assert_eq!(compose(&entry("a.txt"), &settings, 2).0, "a");
    }

    #[test]
    fn test_extension_counter_is_independent() {
        let settings = RenameSettings {
            extension_mask: "part".to_string(),
            keep_original_extension: false,
            extension_counter: Some(Counter::new(0, 5, 3)),
            ..RenameSettings::default()
        };

        assert_eq!(
            compose(&entry("backup.zip"), &settings, 2),
            ("backup".to_string(), "part010".to_string())
        );
    }

    #[test]
    fn test_empty_mask_without_counter() {
        let settings = RenameSettings {
            keep_original_extension: false,
            ..RenameSettings::default()
        };

        assert_eq!(
            compose(&entry("notes.txt"), &settings, 0),
            ("notes".to_string(), String::new())
        );
    }
}
