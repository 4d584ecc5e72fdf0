//! Table-mode record parsing.

use crate::config::ExtractConfig;
use crate::model::{Column, RawRecord, VoterRecord};
use crate::validate;

use super::name::split_combined;
use super::ParseError;

/// Rows with fewer populated cells are stray page text, not voters.
const MIN_POPULATED_CELLS: usize = 3;

/// Parse table rows into records, lazily.
///
/// Blank rows, column-title rows and stray text rows are skipped. Every
/// other row yields its 1-based index with a record, or a [`ParseError`].
pub fn parse_rows<'a>(
    rows: &'a [Vec<String>],
    config: &'a ExtractConfig,
) -> impl Iterator<Item = Result<(usize, VoterRecord), ParseError>> + 'a {
    rows.iter().enumerate().filter_map(move |(i, row)| {
        parse_row(i + 1, row, config).map(|outcome| outcome.map(|record| (i + 1, record)))
    })
}

/// Parse one row; `None` means the row is skipped.
pub fn parse_row(
    index: usize,
    cells: &[String],
    config: &ExtractConfig,
) -> Option<Result<VoterRecord, ParseError>> {
    let populated = cells.iter().filter(|c| !c.trim().is_empty()).count();
    if populated == 0 {
        return None;
    }

    let titles = cells.iter().filter(|c| Column::is_title(c)).count();
    if titles * 2 >= populated {
        log::debug!("row {}: column header row skipped", index);
        return None;
    }

    if populated < MIN_POPULATED_CELLS {
        log::debug!("row {}: stray text skipped ({} cells populated)", index, populated);
        return None;
    }

    if cells.len() < config.min_row_cells {
        return Some(Err(ParseError::new(
            index,
            format!(
                "row has {} cells, expected at least {}",
                cells.len(),
                config.min_row_cells
            ),
        )));
    }

    let raw = raw_from_cells(cells);
    if raw.serial_no.trim().is_empty() {
        return Some(Err(ParseError::new(index, "missing serial number")));
    }

    Some(Ok(validate::finalize(raw, &config.age_range)))
}

/// Map cells onto fields by column position.
fn raw_from_cells(cells: &[String]) -> RawRecord {
    let cell = |column: Column| -> String {
        cells
            .get(column.index())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut raw = RawRecord {
        st_code: cell(Column::StCode),
        ac_no: cell(Column::AcNo),
        part_no: cell(Column::PartNo),
        serial_no: cell(Column::SerialNo),
        house_no: cell(Column::HouseNo),
        first_name_en: cell(Column::FirstNameEn),
        last_name_en: cell(Column::LastNameEn),
        first_name_v1: cell(Column::FirstNameV1),
        last_name_v1: cell(Column::LastNameV1),
        relation_type: cell(Column::RelationType),
        relation_first_name_en: cell(Column::RelationFirstNameEn),
        relation_last_name_en: cell(Column::RelationLastNameEn),
        relation_first_name_v1: cell(Column::RelationFirstNameV1),
        relation_last_name_v1: cell(Column::RelationLastNameV1),
        epic_no: cell(Column::EpicNo),
        gender: cell(Column::Gender),
        age: cell(Column::Age),
    };

    split_combined(&mut raw.first_name_en, &mut raw.last_name_en);
    split_combined(&mut raw.first_name_v1, &mut raw.last_name_v1);
    split_combined(&mut raw.relation_first_name_en, &mut raw.relation_last_name_en);
    split_combined(&mut raw.relation_first_name_v1, &mut raw.relation_last_name_v1);
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, RelationType};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn sample_row() -> Vec<String> {
        row(&[
            "S04", "11", "1", "1", "1", "Samsudin", "Ansari", "समसुद्दीन", "अंसारी", "F", "Israil",
            "Ansari", "इसरायल", "अंसारी", "ZIQ1306695", "M", "39",
        ])
    }

    #[test]
    fn test_sample_row() {
        let config = ExtractConfig::default();
        let record = parse_row(1, &sample_row(), &config).unwrap().unwrap();

        assert_eq!(record.st_code, "S04");
        assert_eq!(record.serial_no, "1");
        assert_eq!(record.first_name_en, "Samsudin");
        assert_eq!(record.last_name_v1, "अंसारी");
        assert_eq!(record.relation_type, RelationType::Father);
        assert_eq!(record.relation_first_name_en, "Israil");
        assert_eq!(record.epic_no, "ZIQ1306695");
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.age, Some(39));
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_short_row_is_error() {
        let config = ExtractConfig::default();
        let mut cells = sample_row();
        cells.truncate(12);

        let err = parse_row(3, &cells, &config).unwrap().unwrap_err();
        assert_eq!(err.row, 3);
        assert!(err.reason.contains("12 cells"));
    }

    #[test]
    fn test_skipped_rows() {
        let config = ExtractConfig::default();
        let blank = vec![String::new(); 17];
        let titles: Vec<String> = Column::ALL.iter().map(|c| c.title().to_string()).collect();
        let mut stray = vec![String::new(); 17];
        stray[5] = "Page 2".to_string();

        let rows = vec![titles, blank, stray, sample_row()];
        let parsed: Vec<_> = parse_rows(&rows, &config).collect();

        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].is_ok());
    }

    #[test]
    fn test_missing_serial_is_error() {
        let config = ExtractConfig::default();
        let mut cells = sample_row();
        cells[3].clear();

        let err = parse_row(2, &cells, &config).unwrap().unwrap_err();
        assert_eq!(err.reason, "missing serial number");
    }

    #[test]
    fn test_combined_name_cell_is_split() {
        let config = ExtractConfig::default();
        let mut cells = sample_row();
        cells[5] = "Mohammad Samsudin Ansari".to_string();
        cells[6].clear();

        let record = parse_row(1, &cells, &config).unwrap().unwrap();
        assert_eq!(record.first_name_en, "Mohammad Samsudin");
        assert_eq!(record.last_name_en, "Ansari");
    }

    #[test]
    fn test_invalid_epic_is_kept() {
        let config = ExtractConfig::default();
        let mut cells = sample_row();
        cells[14] = "ZI1306695".to_string();

        let record = parse_row(1, &cells, &config).unwrap().unwrap();
        assert_eq!(record.epic_no, "ZI1306695");
        assert_eq!(record.warnings.len(), 1);
    }
}
