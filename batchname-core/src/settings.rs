use crate::error::PlanError;

/// Widest zero fill accepted, the usual file name length limit
pub const MAX_ZERO_FILL: usize = 255;

/// Numeric suffix appended to a stem or extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    /// Value given to the first file in the working order
    pub start: i64,
    /// Added once per position
    pub increment: i64,
    /// Minimum number of characters, padded with leading zeros
    pub zero_fill: usize,
}

impl Counter {
    pub fn new(start: i64, increment: i64, zero_fill: usize) -> Self {
        Self {
            start,
            increment,
            zero_fill,
        }
    }

    /// Counter value for the file at `ordinal` in the working order
    pub fn value_at(&self, ordinal: usize) -> i64 {
        self.start
            .saturating_add(self.increment.saturating_mul(ordinal as i64))
    }
}

/// Settings read by the name composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSettings {
    /// Stem used when the original stem is not kept
    pub filename_mask: String,
    /// Extension used when the original extension is not kept
    pub extension_mask: String,
    pub keep_original_filename: bool,
    pub keep_original_extension: bool,
    /// Only applied when the original stem is not kept
    pub filename_counter: Option<Counter>,
    /// Only applied when the original extension is not kept
    pub extension_counter: Option<Counter>,
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self {
            filename_mask: String::new(),
            extension_mask: String::new(),
            keep_original_filename: true,
            keep_original_extension: true,
            filename_counter: None,
            extension_counter: None,
        }
    }
}

/// Raw text of one counter's input fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterForm {
    pub enabled: bool,
    pub start: String,
    pub increment: String,
    pub zero_fill: String,
}

impl Default for CounterForm {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "1".to_string(),
            increment: "1".to_string(),
            zero_fill: "1".to_string(),
        }
    }
}

impl CounterForm {
    /// Parse the fields; a disabled counter is never parsed
    pub fn parse(&self, part: CounterPart) -> Result<Option<Counter>, PlanError> {
        if !self.enabled {
            return Ok(None);
        }

        let [start_field, increment_field, zero_fill_field] = part.field_names();
        let start = parse_field(&self.start, start_field)?;
        let increment = parse_field(&self.increment, increment_field)?;
        let zero_fill = parse_field(&self.zero_fill, zero_fill_field)?;

        if start < 0 {
            return Err(PlanError::InvalidNumberInput {
                field: start_field,
                value: self.start.clone(),
            });
        }
        if zero_fill < 1 || zero_fill > MAX_ZERO_FILL as i64 {
            return Err(PlanError::InvalidNumberInput {
                field: zero_fill_field,
                value: self.zero_fill.clone(),
            });
        }

        Ok(Some(Counter::new(start, increment, zero_fill as usize)))
    }
}

/// Which half of the name a counter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterPart {
    Filename,
    Extension,
}

impl CounterPart {
    fn field_names(self) -> [&'static str; 3] {
        match self {
            CounterPart::Filename => [
                "filename counter start",
                "filename counter increment",
                "filename counter zero fill",
            ],
            CounterPart::Extension => [
                "extension counter start",
                "extension counter increment",
                "extension counter zero fill",
            ],
        }
    }
}

/// Settings as typed into the controls, before number parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub filename_mask: String,
    pub extension_mask: String,
    pub keep_original_filename: bool,
    pub keep_original_extension: bool,
    pub filename_counter: CounterForm,
    pub extension_counter: CounterForm,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            filename_mask: String::new(),
            extension_mask: String::new(),
            keep_original_filename: true,
            keep_original_extension: true,
            filename_counter: CounterForm::default(),
            extension_counter: CounterForm::default(),
        }
    }
}

impl SettingsForm {
    pub fn parse(&self) -> Result<RenameSettings, PlanError> {
        Ok(RenameSettings {
            filename_mask: self.filename_mask.clone(),
            extension_mask: self.extension_mask.clone(),
            keep_original_filename: self.keep_original_filename,
            keep_original_extension: self.keep_original_extension,
            filename_counter: self.filename_counter.parse(CounterPart::Filename)?,
            extension_counter: self.extension_counter.parse(CounterPart::Extension)?,
        })
    }
}

/// Zero fill wide enough to number `file_count` files with the default counter
pub fn suggested_zero_fill(file_count: usize) -> usize {
    if file_count == 0 {
        return 1;
    }
    file_count.to_string().len()
}

fn parse_field(value: &str, field: &'static str) -> Result<i64, PlanError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| PlanError::InvalidNumberInput {
            field,
            value: value.to_string(),
        })
}
