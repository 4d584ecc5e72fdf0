//! Text-mode record parsing.
//!
//! Each text layout is tried against the page in configured order; the
//! first one that matches any line is used for the whole page.

use regex::Captures;

use crate::config::{ExtractConfig, TextLayout};
use crate::model::{RawRecord, VoterRecord};
use crate::validate;

use super::name::split_combined;
use super::ParseError;

/// Lines long enough to hold a record, with 1-based line numbers.
fn candidate_lines(text: &str, min_length: usize) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(move |(_, line)| line.chars().count() >= min_length)
}

/// First layout matching at least one line of the page.
pub fn select_layout<'c>(text: &str, config: &'c ExtractConfig) -> Option<&'c TextLayout> {
    config.layouts.iter().find(|layout| {
        candidate_lines(text, config.min_line_length).any(|(_, line)| layout.regex().is_match(line))
    })
}

/// Parse the lines of a page that match `layout`, lazily.
///
/// Each match yields its 1-based line number with a record, or a
/// [`ParseError`].
pub fn parse_lines<'a>(
    text: &'a str,
    layout: &'a TextLayout,
    config: &'a ExtractConfig,
) -> impl Iterator<Item = Result<(usize, VoterRecord), ParseError>> + 'a {
    candidate_lines(text, config.min_line_length).filter_map(move |(line_no, line)| {
        layout.regex().captures(line).map(|caps| {
            record_from_captures(line_no, &caps, config).map(|record| (line_no, record))
        })
    })
}

fn record_from_captures(
    line_no: usize,
    caps: &Captures<'_>,
    config: &ExtractConfig,
) -> Result<VoterRecord, ParseError> {
    let get = |name: &str| -> String {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };

    let mut raw = RawRecord {
        st_code: get("st_code"),
        ac_no: get("ac_no"),
        part_no: get("part_no"),
        serial_no: get("serial_no"),
        house_no: get("house_no"),
        first_name_en: get("first_name_en"),
        last_name_en: get("last_name_en"),
        first_name_v1: get("first_name_v1"),
        last_name_v1: get("last_name_v1"),
        relation_type: get("relation_type"),
        relation_first_name_en: get("relation_first_name_en"),
        relation_last_name_en: get("relation_last_name_en"),
        relation_first_name_v1: get("relation_first_name_v1"),
        relation_last_name_v1: get("relation_last_name_v1"),
        epic_no: get("epic_no"),
        gender: get("gender"),
        age: get("age"),
    };

    if raw.first_name_en.is_empty() {
        raw.first_name_en = get("name");
    }
    split_combined(&mut raw.first_name_en, &mut raw.last_name_en);

    if raw.serial_no.is_empty() {
        return Err(ParseError::new(line_no, "missing serial number"));
    }

    Ok(validate::finalize(raw, &config.age_range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutKind, TextLayout};
    use crate::model::{Gender, RelationType};

    const PAGE: &str = "ELECTORAL ROLL 2024\n\
        1 1 Samsudin Ansari समसुद्दीन अंसारी F Israil Ansari इसरायल अंसारी ZIQ1306695 M 39\n\
        2 1 Rahima Khatun रहीमा खातून H Samsudin Ansari समसुद्दीन अंसारी ZIQ1306703 F 35\n\
        Page 1";

    #[test]
    fn test_bilingual_page() {
        let config = ExtractConfig::default();
        let layout = select_layout(PAGE, &config).unwrap();
        assert_eq!(layout.kind(), &LayoutKind::Bilingual);

        let parsed: Vec<_> = parse_lines(PAGE, layout, &config)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, 2);
        let records: Vec<_> = parsed.into_iter().map(|(_, r)| r).collect();
        assert_eq!(records[0].first_name_v1, "समसुद्दीन");
        assert_eq!(records[0].relation_type, RelationType::Father);
        assert_eq!(records[1].relation_type, RelationType::Husband);
        assert_eq!(records[1].gender, Gender::Female);
        assert_eq!(records[1].age, Some(35));
    }

    #[test]
    fn test_english_only_page_with_prefix() {
        let config = ExtractConfig::default();
        let page = "S04 11 1 7 12 Rahima Khatun H Samsudin Ansari ZIQ1306703 F 35";
        let layout = select_layout(page, &config).unwrap();
        assert_eq!(layout.kind(), &LayoutKind::EnglishOnly);

        let (_, record) = parse_lines(page, layout, &config).next().unwrap().unwrap();
        assert_eq!(record.st_code, "S04");
        assert_eq!(record.ac_no, "11");
        assert_eq!(record.part_no, "1");
        assert_eq!(record.serial_no, "7");
        assert_eq!(record.house_no, "12");
        assert_eq!(record.first_name_v1, "");
    }

    #[test]
    fn test_compact_layout_splits_name() {
        let config = ExtractConfig::default();
        let page = "3 Sita Devi Sharma ZIQ1306711 F 41";
        let layout = select_layout(page, &config).unwrap();
        assert_eq!(layout.kind(), &LayoutKind::Compact);

        let (_, record) = parse_lines(page, layout, &config).next().unwrap().unwrap();
        assert_eq!(record.first_name_en, "Sita Devi");
        assert_eq!(record.last_name_en, "Sharma");
    }

    #[test]
    fn test_first_configured_layout_wins() {
        let page = "5 Ram Lal ZIQ1306729 M 52 extra text";
        let first = TextLayout::custom("serial-only", r"^(?P<serial_no>\d+)\s").unwrap();
        let config = ExtractConfig::default().with_layouts(vec![first, TextLayout::compact()]);

        assert_eq!(select_layout(page, &config).unwrap().name(), "serial-only");

        let reversed = ExtractConfig::default().with_layouts(vec![
            TextLayout::compact(),
            TextLayout::custom("serial-only", r"^(?P<serial_no>\d+)\s").unwrap(),
        ]);
        assert_eq!(select_layout(page, &reversed).unwrap().name(), "compact");
    }

    #[test]
    fn test_no_layout_matches() {
        let config = ExtractConfig::default();
        assert!(select_layout("Draft roll, not for publication\nPage 1", &config).is_none());
    }

    #[test]
    fn test_short_lines_ignored() {
        let config = ExtractConfig::default().with_min_line_length(40);
        assert!(select_layout("3 Sita Devi Sharma ZIQ1306711 F 41", &config).is_none());
    }

    #[test]
    fn test_optional_serial_group_reports_error() {
        let layout =
            TextLayout::custom("loose", r"(?P<serial_no>\d+)?\s*(?P<epic_no>[A-Z]{3}\d{7})").unwrap();
        let config = ExtractConfig::default().with_layouts(vec![layout.clone()]);
        let page = "no serial here ZIQ1306711 at all";

        let err = parse_lines(page, &layout, &config).next().unwrap().unwrap_err();
        assert_eq!(err.row, 1);
    }
}
