use batchname_core::{CounterForm, SettingsForm, SortColumn};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Batch rename files from a mask, the original name, and a counter
#[derive(Parser, Debug)]
#[command(name = "batchname")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Batch rename files with masks and zero-padded counters", long_about = None)]
pub struct Args {
    /// Files to rename (directories and missing paths are skipped)
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// New filename (stem); keeps the original stem when omitted
    #[arg(short = 'm', long = "mask")]
    pub mask: Option<String>,

    /// New extension; keeps the original extension when omitted
    #[arg(short = 'e', long = "ext-mask")]
    pub ext_mask: Option<String>,

    /// Append a counter to the filename mask, starting at this value
    #[arg(short = 'c', long = "counter", value_name = "START")]
    pub counter: Option<String>,

    /// Filename counter step
    #[arg(long = "increment", default_value = "1")]
    pub increment: String,

    /// Filename counter width (defaults to the digits in the file count)
    #[arg(long = "zero-fill")]
    pub zero_fill: Option<String>,

    /// Append a counter to the extension mask, starting at this value
    #[arg(long = "ext-counter", value_name = "START")]
    pub ext_counter: Option<String>,

    /// Extension counter step
    #[arg(long = "ext-increment", default_value = "1")]
    pub ext_increment: String,

    /// Extension counter width (defaults to the digits in the file count)
    #[arg(long = "ext-zero-fill")]
    pub ext_zero_fill: Option<String>,

    /// Column that decides the order counters are handed out in
    #[arg(long = "sort", value_enum)]
    pub sort: Option<SortKey>,

    /// Sort descending
    #[arg(long = "desc", requires = "sort")]
    pub desc: bool,

    /// Run in dry-run mode (preview changes without renaming)
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Print the preview as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    /// Original file name
    Original,
    /// Proposed stem
    Stem,
    /// Proposed extension
    Extension,
    /// Proposed full name
    Name,
}

impl From<SortKey> for SortColumn {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Original => SortColumn::OriginalName,
            SortKey::Stem => SortColumn::ProposedStem,
            SortKey::Extension => SortColumn::ProposedExtension,
            SortKey::Name => SortColumn::ProposedName,
        }
    }
}

impl Args {
    /// Map the flags onto the settings controls; a mask turns off "keep original"
    pub fn settings_form(&self, suggested_zero_fill: usize) -> SettingsForm {
        let default_fill = suggested_zero_fill.to_string();

        SettingsForm {
            filename_mask: self.mask.clone().unwrap_or_default(),
            extension_mask: self.ext_mask.clone().unwrap_or_default(),
            keep_original_filename: self.mask.is_none() && self.counter.is_none(),
            keep_original_extension: self.ext_mask.is_none() && self.ext_counter.is_none(),
            filename_counter: counter_form(
                self.counter.as_deref(),
                &self.increment,
                self.zero_fill.as_deref().unwrap_or(&default_fill),
            ),
            extension_counter: counter_form(
                self.ext_counter.as_deref(),
                &self.ext_increment,
                self.ext_zero_fill.as_deref().unwrap_or(&default_fill),
            ),
        }
    }
}

fn counter_form(start: Option<&str>, increment: &str, zero_fill: &str) -> CounterForm {
    CounterForm {
        enabled: start.is_some(),
        start: start.unwrap_or("1").to_string(),
        increment: increment.to_string(),
        zero_fill: zero_fill.to_string(),
    }
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
