//! Voter record types.

use std::fmt;

use serde::Serialize;

/// Relation of the voter to the person named in the relation columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RelationType {
    /// Father (also used for S/O and D/O)
    Father,
    /// Husband (also used for W/O)
    Husband,
    /// Missing or unrecognized
    #[default]
    Unknown,
}

impl RelationType {
    /// Interpret a relation cell or captured token.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "F" | "S/O" | "D/O" | "पिता" => Self::Father,
            "H" | "H/O" | "W/O" | "पति" => Self::Husband,
            other if other.eq_ignore_ascii_case("father") => Self::Father,
            other if other.eq_ignore_ascii_case("husband") => Self::Husband,
            _ => Self::Unknown,
        }
    }

    /// Spreadsheet representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Father => "Father",
            Self::Husband => "Husband",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voter gender code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Gender {
    /// M
    Male,
    /// F
    Female,
    /// Missing or unrecognized
    #[default]
    Unknown,
}

impl Gender {
    /// Interpret a gender cell or captured token.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "M" | "पुरुष" => Self::Male,
            "F" | "महिला" | "स्त्री" => Self::Female,
            other if other.eq_ignore_ascii_case("male") => Self::Male,
            other if other.eq_ignore_ascii_case("female") => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Spreadsheet representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field that failed normalization. The record is kept regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationWarning {
    /// EPIC number does not match the three-letters-seven-digits format
    InvalidEpic(String),
    /// Age parsed but falls outside the plausible range
    AgeOutOfRange(u32),
    /// Age is not a number; it is recorded as unknown
    InvalidAge(String),
    /// Gender is not a recognized code; it is recorded as unknown
    UnknownGender(String),
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEpic(epic) => write!(f, "invalid EPIC number '{}'", epic),
            Self::AgeOutOfRange(age) => write!(f, "age {} out of range", age),
            Self::InvalidAge(raw) => write!(f, "age '{}' is not a number", raw),
            Self::UnknownGender(raw) => write!(f, "unknown gender '{}'", raw),
        }
    }
}

/// Output columns, in spreadsheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    StCode,
    AcNo,
    PartNo,
    SerialNo,
    HouseNo,
    FirstNameEn,
    LastNameEn,
    FirstNameV1,
    LastNameV1,
    RelationType,
    RelationFirstNameEn,
    RelationLastNameEn,
    RelationFirstNameV1,
    RelationLastNameV1,
    EpicNo,
    Gender,
    Age,
}

impl Column {
    /// All columns in output order.
    pub const ALL: [Column; 17] = [
        Column::StCode,
        Column::AcNo,
        Column::PartNo,
        Column::SerialNo,
        Column::HouseNo,
        Column::FirstNameEn,
        Column::LastNameEn,
        Column::FirstNameV1,
        Column::LastNameV1,
        Column::RelationType,
        Column::RelationFirstNameEn,
        Column::RelationLastNameEn,
        Column::RelationFirstNameV1,
        Column::RelationLastNameV1,
        Column::EpicNo,
        Column::Gender,
        Column::Age,
    ];

    /// Header title.
    pub fn title(&self) -> &'static str {
        match self {
            Column::StCode => "ST_CODE",
            Column::AcNo => "AC_NO",
            Column::PartNo => "PART_NO",
            Column::SerialNo => "SLNOINPART",
            Column::HouseNo => "C_HOUSE_NO",
            Column::FirstNameEn => "FM_NAME_EN",
            Column::LastNameEn => "LASTNAME_EN",
            Column::FirstNameV1 => "FM_NAME_V1",
            Column::LastNameV1 => "LASTNAME_V1",
            Column::RelationType => "RLN_TYPE",
            Column::RelationFirstNameEn => "RLN_FM_NM_EN",
            Column::RelationLastNameEn => "RLN_L_NM_EN",
            Column::RelationFirstNameV1 => "RLN_FM_NM_V1",
            Column::RelationLastNameV1 => "RLN_L_NM_V1",
            Column::EpicNo => "EPIC_NO",
            Column::Gender => "GENDER",
            Column::Age => "AGE",
        }
    }

    /// Zero-based position in the output.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether `text` is one of the column titles.
    pub fn is_title(text: &str) -> bool {
        let text = text.trim();
        Self::ALL.iter().any(|c| c.title().eq_ignore_ascii_case(text))
    }
}

/// Value of one spreadsheet cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    /// Written as a string
    Text(&'a str),
    /// Written as a number (AGE)
    Number(f64),
    /// Left blank
    Empty,
}

/// Unvalidated record fields as read from a table row or a text match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub st_code: String,
    pub ac_no: String,
    pub part_no: String,
    pub serial_no: String,
    pub house_no: String,
    pub first_name_en: String,
    pub last_name_en: String,
    pub first_name_v1: String,
    pub last_name_v1: String,
    pub relation_type: String,
    pub relation_first_name_en: String,
    pub relation_last_name_en: String,
    pub relation_first_name_v1: String,
    pub relation_last_name_v1: String,
    pub epic_no: String,
    pub gender: String,
    pub age: String,
}

/// One voter, with fields in spreadsheet column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoterRecord {
    pub st_code: String,
    pub ac_no: String,
    pub part_no: String,
    pub serial_no: String,
    pub house_no: String,
    pub first_name_en: String,
    pub last_name_en: String,
    pub first_name_v1: String,
    pub last_name_v1: String,
    pub relation_type: RelationType,
    pub relation_first_name_en: String,
    pub relation_last_name_en: String,
    pub relation_first_name_v1: String,
    pub relation_last_name_v1: String,
    pub epic_no: String,
    pub gender: Gender,
    /// `None` when the source had no usable age
    pub age: Option<u32>,
    /// Fields that failed validation
    pub warnings: Vec<ValidationWarning>,
}

impl VoterRecord {
    /// Cell value for a column.
    pub fn value(&self, column: Column) -> CellValue<'_> {
        let text = match column {
            Column::StCode => &self.st_code,
            Column::AcNo => &self.ac_no,
            Column::PartNo => &self.part_no,
            Column::SerialNo => &self.serial_no,
            Column::HouseNo => &self.house_no,
            Column::FirstNameEn => &self.first_name_en,
            Column::LastNameEn => &self.last_name_en,
            Column::FirstNameV1 => &self.first_name_v1,
            Column::LastNameV1 => &self.last_name_v1,
            Column::RelationType => return text_or_empty(self.relation_type.as_str()),
            Column::RelationFirstNameEn => &self.relation_first_name_en,
            Column::RelationLastNameEn => &self.relation_last_name_en,
            Column::RelationFirstNameV1 => &self.relation_first_name_v1,
            Column::RelationLastNameV1 => &self.relation_last_name_v1,
            Column::EpicNo => &self.epic_no,
            Column::Gender => return text_or_empty(self.gender.as_str()),
            Column::Age => {
                return match self.age {
                    Some(age) => CellValue::Number(f64::from(age)),
                    None => CellValue::Empty,
                }
            }
        };
        text_or_empty(text)
    }

    /// Whether any field failed validation.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

fn text_or_empty(text: &str) -> CellValue<'_> {
    if text.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(text)
    }
}
