//! Field validation and normalization.
//!
//! Validation never discards a record: problems are attached to the record
//! as [`ValidationWarning`]s so the roll stays complete.

use std::ops::RangeInclusive;

use unicode_normalization::UnicodeNormalization;

use crate::model::{Gender, RawRecord, RelationType, ValidationWarning, VoterRecord};

const EPIC_LETTERS: usize = 3;
const EPIC_DIGITS: usize = 7;

/// Trim and NFC-normalize a cell value.
pub fn normalize_text(raw: &str) -> String {
    raw.trim().nfc().collect()
}

/// Whether `epic` is three uppercase ASCII letters followed by seven digits.
pub fn is_valid_epic(epic: &str) -> bool {
    let bytes = epic.as_bytes();
    bytes.len() == EPIC_LETTERS + EPIC_DIGITS
        && bytes[..EPIC_LETTERS].iter().all(u8::is_ascii_uppercase)
        && bytes[EPIC_LETTERS..].iter().all(u8::is_ascii_digit)
}

/// Check an EPIC number. Empty values are not flagged.
pub fn check_epic(epic: &str) -> Option<ValidationWarning> {
    if epic.is_empty() || is_valid_epic(epic) {
        None
    } else {
        Some(ValidationWarning::InvalidEpic(epic.to_string()))
    }
}

/// Parse an age cell.
///
/// Out-of-range ages are kept with a warning; non-numeric ages become
/// unknown with a warning. An empty cell is simply unknown.
pub fn parse_age(raw: &str, range: &RangeInclusive<u32>) -> (Option<u32>, Option<ValidationWarning>) {
    let raw = raw.trim();
    if raw.is_empty() {
        return (None, None);
    }
    match raw.parse::<u32>() {
        Ok(age) if range.contains(&age) => (Some(age), None),
        Ok(age) => (Some(age), Some(ValidationWarning::AgeOutOfRange(age))),
        Err(_) => (None, Some(ValidationWarning::InvalidAge(raw.to_string()))),
    }
}

/// Normalize a gender cell.
pub fn parse_gender(raw: &str) -> (Gender, Option<ValidationWarning>) {
    let gender = Gender::parse(raw);
    let raw = raw.trim();
    if gender == Gender::Unknown && !raw.is_empty() {
        (gender, Some(ValidationWarning::UnknownGender(raw.to_string())))
    } else {
        (gender, None)
    }
}

/// Validate raw fields into a [`VoterRecord`].
pub fn finalize(raw: RawRecord, age_range: &RangeInclusive<u32>) -> VoterRecord {
    let mut warnings = Vec::new();

    let epic_no = normalize_text(&raw.epic_no);
    warnings.extend(check_epic(&epic_no));

    let (gender, warning) = parse_gender(&normalize_text(&raw.gender));
    warnings.extend(warning);

    let (age, warning) = parse_age(&normalize_text(&raw.age), age_range);
    warnings.extend(warning);

    VoterRecord {
        st_code: normalize_text(&raw.st_code),
        ac_no: normalize_text(&raw.ac_no),
        part_no: normalize_text(&raw.part_no),
        serial_no: normalize_text(&raw.serial_no),
        house_no: normalize_text(&raw.house_no),
        first_name_en: normalize_text(&raw.first_name_en),
        last_name_en: normalize_text(&raw.last_name_en),
        first_name_v1: normalize_text(&raw.first_name_v1),
        last_name_v1: normalize_text(&raw.last_name_v1),
        relation_type: RelationType::parse(&normalize_text(&raw.relation_type)),
        relation_first_name_en: normalize_text(&raw.relation_first_name_en),
        relation_last_name_en: normalize_text(&raw.relation_last_name_en),
        relation_first_name_v1: normalize_text(&raw.relation_first_name_v1),
        relation_last_name_v1: normalize_text(&raw.relation_last_name_v1),
        epic_no,
        gender,
        age,
        warnings,
    }
}
