//! Extraction configuration.
//!
//! An [`ExtractConfig`] is built once, either from defaults and builder
//! methods or from a JSON file, and then shared read-only by the
//! orchestrator, record parser and spreadsheet writer.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::parser::TableDetectorConfig;

/// Name of the worksheet every output file carries.
pub const SHEET_NAME: &str = "Electoral_Data";

/// Optional `S04 11 1` prefix carrying state code, AC and part numbers.
const PREFIX: &str = r"(?:(?P<st_code>S\d{2})\s+(?P<ac_no>\d+)\s+(?P<part_no>\d+)\s+)?";
const RELATION: &str = r"(?P<relation_type>Father|Husband|S/O|H/O|D/O|W/O|पिता|पति|F|H)";
const TAIL: &str = r"(?P<epic_no>[A-Z0-9]{10})\s+(?P<gender>[MF])\s+(?P<age>\d+)";

/// Named groups a text layout may populate.
pub const KNOWN_GROUPS: &[&str] = &[
    "st_code",
    "ac_no",
    "part_no",
    "serial_no",
    "house_no",
    "name",
    "first_name_en",
    "last_name_en",
    "first_name_v1",
    "last_name_v1",
    "relation_type",
    "relation_first_name_en",
    "relation_last_name_en",
    "relation_first_name_v1",
    "relation_last_name_v1",
    "epic_no",
    "gender",
    "age",
];

/// Which text layout a pattern describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutKind {
    /// English and Devanagari names on one line
    Bilingual,
    /// English names only
    EnglishOnly,
    /// Serial, combined name, EPIC, gender and age
    Compact,
    /// User-supplied pattern
    Custom(String),
}

/// One observed text layout of a roll page, as a regex with named groups.
#[derive(Debug, Clone)]
pub struct TextLayout {
    kind: LayoutKind,
    regex: Regex,
}

impl TextLayout {
    /// Bilingual layout:
    /// `1 1 Samsudin Ansari समसुद्दीन अंसारी F Israil Ansari इसरायल अंसारी ZIQ1306695 M 39`
    pub fn bilingual() -> Self {
        let pattern = format!(
            r"{PREFIX}(?P<serial_no>\d+)\s+(?P<house_no>\S+)\s+(?P<first_name_en>[A-Za-z.]+)\s+(?P<last_name_en>[A-Za-z.]+)\s+(?P<first_name_v1>\p{{Devanagari}}+)\s+(?P<last_name_v1>\p{{Devanagari}}+)\s+{RELATION}\s+(?P<relation_first_name_en>[A-Za-z.]+)\s+(?P<relation_last_name_en>[A-Za-z.]+)\s+(?P<relation_first_name_v1>\p{{Devanagari}}+)\s+(?P<relation_last_name_v1>\p{{Devanagari}}+)\s+{TAIL}"
        );
        Self::builtin(LayoutKind::Bilingual, &pattern)
    }

    /// English-only layout: `1 1 Samsudin Ansari F Israil Ansari ZIQ1306695 M 39`
    pub fn english_only() -> Self {
        let pattern = format!(
            r"{PREFIX}(?P<serial_no>\d+)\s+(?P<house_no>\S+)\s+(?P<first_name_en>[A-Za-z.]+)\s+(?P<last_name_en>[A-Za-z.]+)\s+{RELATION}\s+(?P<relation_first_name_en>[A-Za-z.]+)\s+(?P<relation_last_name_en>[A-Za-z.]+)\s+{TAIL}"
        );
        Self::builtin(LayoutKind::EnglishOnly, &pattern)
    }

    /// Compact layout: `1 Samsudin Ansari ZIQ1306695 M 39`
    pub fn compact() -> Self {
        let pattern = format!(r"(?P<serial_no>\d+)\s+(?P<name>[^\d]+?)\s+{TAIL}");
        Self::builtin(LayoutKind::Compact, &pattern)
    }

    fn builtin(kind: LayoutKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("built-in layout pattern is valid"),
        }
    }

    /// Compile a user-supplied layout.
    ///
    /// The pattern must capture `serial_no`, and every named group must be
    /// one of [`KNOWN_GROUPS`].
    pub fn custom(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern)?;

        let mut has_serial = false;
        for group in regex.capture_names().flatten() {
            if !KNOWN_GROUPS.contains(&group) {
                return Err(Error::Config(format!(
                    "layout '{}': unknown capture group '{}'",
                    name, group
                )));
            }
            has_serial |= group == "serial_no";
        }
        if !has_serial {
            return Err(Error::Config(format!(
                "layout '{}': pattern must capture 'serial_no'",
                name
            )));
        }

        Ok(Self {
            kind: LayoutKind::Custom(name),
            regex,
        })
    }

    /// Layout kind.
    pub fn kind(&self) -> &LayoutKind {
        &self.kind
    }

    /// Display name of the layout.
    pub fn name(&self) -> &str {
        match &self.kind {
            LayoutKind::Bilingual => "bilingual",
            LayoutKind::EnglishOnly => "english-only",
            LayoutKind::Compact => "compact",
            LayoutKind::Custom(name) => name,
        }
    }

    /// Compiled pattern.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Built-in layouts in match priority order.
pub fn builtin_layouts() -> Vec<TextLayout> {
    vec![
        TextLayout::bilingual(),
        TextLayout::english_only(),
        TextLayout::compact(),
    ]
}

/// Options for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Text layouts, tried in order; the first one matching a page wins
    pub layouts: Vec<TextLayout>,

    /// Fewest aligned columns for a page to be read as a table
    pub min_table_columns: usize,

    /// Most columns a table may have before it is treated as word soup
    pub max_table_columns: usize,

    /// Cells a table row needs to be a voter record
    pub min_row_cells: usize,

    /// Text lines shorter than this are not matched
    pub min_line_length: usize,

    /// Plausible voter ages; others are kept with a warning
    pub age_range: RangeInclusive<u32>,

    /// Walk input directories recursively
    pub recursive: bool,

    /// Widest spreadsheet column, in characters
    pub max_column_width: usize,

    /// Worksheet name
    pub sheet_name: String,

    /// Files per batch, for front ends that chunk their input
    pub batch_size: usize,

    /// Per-file time budget for front ends, in seconds (not enforced here)
    pub timeout_secs: Option<u64>,
}

impl ExtractConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&data)
    }

    /// Parse a configuration from JSON text.
    ///
    /// Absent keys keep their defaults. Custom layouts are appended after
    /// the built-ins unless `replace_builtin_layouts` is set.
    pub fn from_json(data: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(data)?;
        file.into_config()
    }

    /// Append a text layout after the existing ones.
    pub fn with_layout(mut self, layout: TextLayout) -> Self {
        self.layouts.push(layout);
        self
    }

    /// Replace all text layouts.
    pub fn with_layouts(mut self, layouts: Vec<TextLayout>) -> Self {
        self.layouts = layouts;
        self
    }

    /// Set the minimum table column count.
    pub fn with_min_table_columns(mut self, columns: usize) -> Self {
        self.min_table_columns = columns;
        self
    }

    /// Set the minimum number of cells in a table row.
    pub fn with_min_row_cells(mut self, cells: usize) -> Self {
        self.min_row_cells = cells;
        self
    }

    /// Set the minimum text line length.
    pub fn with_min_line_length(mut self, length: usize) -> Self {
        self.min_line_length = length;
        self
    }

    /// Set the accepted age range.
    pub fn with_age_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.age_range = range;
        self
    }

    /// Enable or disable recursive directory expansion.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the widest spreadsheet column.
    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Set the batch size hint.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the per-file timeout hint.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Table detector settings derived from this configuration.
    pub fn table_detector_config(&self) -> TableDetectorConfig {
        TableDetectorConfig {
            min_columns: self.min_table_columns,
            max_columns: self.max_table_columns,
            ..TableDetectorConfig::default()
        }
    }

    /// Check option consistency.
    pub fn validate(&self) -> Result<()> {
        if self.layouts.is_empty() {
            return Err(Error::Config("at least one text layout is required".into()));
        }
        if self.min_table_columns < 2 {
            return Err(Error::Config("min_table_columns must be at least 2".into()));
        }
        if self.max_table_columns < self.min_table_columns {
            return Err(Error::Config(
                "max_table_columns must not be below min_table_columns".into(),
            ));
        }
        if self.age_range.is_empty() {
            return Err(Error::Config("age_range is empty".into()));
        }
        if self.max_column_width == 0 {
            return Err(Error::Config("max_column_width must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            layouts: builtin_layouts(),
            min_table_columns: 5,
            max_table_columns: 24,
            min_row_cells: 17,
            min_line_length: 20,
            age_range: 18..=120,
            recursive: true,
            max_column_width: 50,
            sheet_name: SHEET_NAME.to_string(),
            batch_size: 100,
            timeout_secs: Some(300),
        }
    }
}

/// On-disk configuration format.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    layouts: Vec<LayoutEntry>,
    replace_builtin_layouts: bool,
    min_table_columns: Option<usize>,
    max_table_columns: Option<usize>,
    min_row_cells: Option<usize>,
    min_line_length: Option<usize>,
    min_age: Option<u32>,
    max_age: Option<u32>,
    recursive: Option<bool>,
    max_column_width: Option<usize>,
    batch_size: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutEntry {
    name: String,
    pattern: String,
}

impl ConfigFile {
    fn into_config(self) -> Result<ExtractConfig> {
        let mut config = ExtractConfig::default();

        let custom = self
            .layouts
            .iter()
            .map(|entry| TextLayout::custom(entry.name.clone(), &entry.pattern))
            .collect::<Result<Vec<_>>>()?;
        if self.replace_builtin_layouts {
            config.layouts = custom;
        } else {
            config.layouts.extend(custom);
        }

        if let Some(v) = self.min_table_columns {
            config.min_table_columns = v;
        }
        if let Some(v) = self.max_table_columns {
            config.max_table_columns = v;
        }
        if let Some(v) = self.min_row_cells {
            config.min_row_cells = v;
        }
        if let Some(v) = self.min_line_length {
            config.min_line_length = v;
        }
        let min_age = self.min_age.unwrap_or(*config.age_range.start());
        let max_age = self.max_age.unwrap_or(*config.age_range.end());
        config.age_range = min_age..=max_age;
        if let Some(v) = self.recursive {
            config.recursive = v;
        }
        if let Some(v) = self.max_column_width {
            config.max_column_width = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.timeout_secs {
            config.timeout_secs = Some(v);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.layouts.len(), 3);
        assert_eq!(config.layouts[0].name(), "bilingual");
        assert_eq!(config.min_table_columns, 5);
        assert_eq!(config.min_row_cells, 17);
        assert_eq!(config.age_range, 18..=120);
        assert_eq!(config.sheet_name, "Electoral_Data");
        assert!(config.recursive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_processing_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.timeout_secs, Some(300));
        assert_eq!(config.min_line_length, 20);
        assert_eq!(config.max_column_width, 50);

        let loaded = ExtractConfig::from_json(r#"{ "batch_size": 25 }"#).unwrap();
        assert_eq!(loaded.batch_size, 25);
        assert_eq!(loaded.timeout_secs, Some(300));
    }

    #[test]
    fn test_builder() {
        let config = ExtractConfig::new()
            .with_min_table_columns(6)
            .with_age_range(21..=99)
            .recursive(false)
            .with_timeout_secs(30);

        assert_eq!(config.min_table_columns, 6);
        assert_eq!(config.table_detector_config().min_columns, 6);
        assert_eq!(config.age_range, 21..=99);
        assert!(!config.recursive);
        assert_eq!(config.timeout_secs, Some(30));
    }

    #[test]
    fn test_builtin_layouts_match_sample_lines() {
        let bilingual = TextLayout::bilingual();
        let caps = bilingual
            .regex()
            .captures("1 1 Samsudin Ansari समसुद्दीन अंसारी F Israil Ansari इसरायल अंसारी ZIQ1306695 M 39")
            .unwrap();
        assert_eq!(&caps["first_name_v1"], "समसुद्दीन");
        assert_eq!(&caps["relation_type"], "F");
        assert_eq!(&caps["age"], "39");

        let english = TextLayout::english_only();
        let caps = english
            .regex()
            .captures("S04 11 1 7 12 Rahima Khatun H Samsudin Ansari ZIQ1306703 F 35")
            .unwrap();
        assert_eq!(&caps["st_code"], "S04");
        assert_eq!(&caps["serial_no"], "7");
        assert_eq!(&caps["house_no"], "12");
        assert_eq!(&caps["relation_type"], "H");

        let compact = TextLayout::compact();
        let caps = compact.regex().captures("3 Sita Devi Sharma ZIQ1306711 F 41").unwrap();
        assert_eq!(&caps["name"], "Sita Devi Sharma");
    }

    #[test]
    fn test_custom_layout_requires_serial() {
        let err = TextLayout::custom("bad", r"(?P<epic_no>[A-Z]{3}\d{7})").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = TextLayout::custom("typo", r"(?P<serial_no>\d+) (?P<epik>\w+)").unwrap_err();
        assert!(err.to_string().contains("epik"));

        let layout = TextLayout::custom("pipe", r"(?P<serial_no>\d+)\|(?P<name>[^|]+)").unwrap();
        assert_eq!(layout.name(), "pipe");
    }

    #[test]
    fn test_from_json() {
        let config = ExtractConfig::from_json(
            r#"{
                "layouts": [{"name": "pipe", "pattern": "(?P<serial_no>\\d+)\\|(?P<name>[^|]+)"}],
                "min_row_cells": 15,
                "max_age": 110,
                "recursive": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.layouts.len(), 4);
        assert_eq!(config.layouts[3].name(), "pipe");
        assert_eq!(config.min_row_cells, 15);
        assert_eq!(config.age_range, 18..=110);
        assert!(!config.recursive);
    }

    #[test]
    fn test_from_json_replaces_builtins() {
        let config = ExtractConfig::from_json(
            r#"{"replace_builtin_layouts": true,
                "layouts": [{"name": "only", "pattern": "(?P<serial_no>\\d+)"}]}"#,
        )
        .unwrap();
        assert_eq!(config.layouts.len(), 1);
        assert_eq!(config.layouts[0].kind(), &LayoutKind::Custom("only".into()));
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            ExtractConfig::from_json(r#"{"unknown_key": 1}"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            ExtractConfig::from_json(r#"{"replace_builtin_layouts": true}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ExtractConfig::from_json(r#"{"layouts": [{"name": "x", "pattern": "("}]}"#),
            Err(Error::Pattern(_))
        ));
    }
}
