//! Roll header parsing (state, assembly constituency, polling station).

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::RollHeader;

/// Longest value still read as a state code (`S04`).
const MAX_STATE_CODE_LEN: usize = 4;

struct HeaderPatterns {
    state: Vec<Regex>,
    constituency: Vec<Regex>,
    booth: Vec<Regex>,
}

fn patterns() -> &'static HeaderPatterns {
    static PATTERNS: OnceLock<HeaderPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |list: &[&str]| -> Vec<Regex> {
            list.iter()
                .map(|p| Regex::new(p).expect("header pattern is valid"))
                .collect()
        };
        HeaderPatterns {
            state: compile(&[
                r"(?i)\bState\s*Code\s*[:\-]?\s*(\w+)",
                r"(?i)\bST_CODE\s*[:\-]?\s*(S\d+)\b",
                r"राज्य\s*[:\-]?\s*([^\n]+)",
                r"(?i)\bState\b\s*[:\-]\s*([^\n]+)",
            ]),
            constituency: compile(&[
                r"विधान\s*सभा\s*[:\-]?\s*(\d+)\s*-\s*([^\n]+)",
                r"(?i)Assembly\s*Constituency\s*[:\-]?\s*(\d+)(?:\s*-\s*([^\n]+))?",
                r"(?i)\bAC\s*[:\-]?\s*(\d+)\s*-\s*([^\n]+)",
                r"(?i)\bAC_NO\s*[:\-]?\s*(\d+)",
            ]),
            booth: compile(&[
                r"मतदान\s*केंद्र\s*[:\-]?\s*(\d+)\s*-\s*([^\n]+)",
                r"(?i)Polling\s*Station\s*[:\-]?\s*(\d+)(?:\s*-\s*([^\n]+))?",
                r"(?i)\bPS\s*[:\-]?\s*(\d+)\s*-\s*([^\n]+)",
                r"(?i)\bPART(?:\s*NO)?\s*[:.\-]?\s*(\d+)",
            ]),
        }
    })
}

/// First match among `patterns`, as (value, optional name).
fn first_match(patterns: &[Regex], text: &str) -> Option<(String, Option<String>)> {
    patterns.iter().find_map(|re| {
        re.captures(text).map(|caps| {
            let value = caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
            let name = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty());
            (value, name)
        })
    })
}

/// Read header values from one page's text.
pub fn parse_header(text: &str) -> RollHeader {
    let text: String = text.nfc().collect();
    let patterns = patterns();
    let mut header = RollHeader::default();

    if let Some((value, _)) = first_match(&patterns.state, &text) {
        if value.starts_with('S') && value.chars().count() <= MAX_STATE_CODE_LEN {
            header.state_code = Some(value);
        } else if !value.is_empty() {
            header.state_name = Some(value);
        }
    }

    if let Some((number, name)) = first_match(&patterns.constituency, &text) {
        header.ac_no = Some(number);
        header.ac_name = name;
    }

    if let Some((number, name)) = first_match(&patterns.booth, &text) {
        header.part_no = Some(number);
        header.booth_name = name;
    }

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_header() {
        let header = parse_header(
            "State Code: S04\nAssembly Constituency: 11 - Narkatiaganj\nPolling Station: 1 - Primary School Bhitaha",
        );
        assert_eq!(header.state_code.as_deref(), Some("S04"));
        assert_eq!(header.ac_no.as_deref(), Some("11"));
        assert_eq!(header.ac_name.as_deref(), Some("Narkatiaganj"));
        assert_eq!(header.part_no.as_deref(), Some("1"));
        assert_eq!(header.booth_name.as_deref(), Some("Primary School Bhitaha"));
    }

    #[test]
    fn test_hindi_header() {
        let header = parse_header("राज्य : बिहार\nविधान सभा : 11 - नरकटियागंज\nमतदान केंद्र : 3 - प्राथमिक विद्यालय");
        assert_eq!(header.state_code, None);
        assert_eq!(header.state_name.as_deref(), Some("बिहार"));
        assert_eq!(header.ac_no.as_deref(), Some("11"));
        assert_eq!(header.part_no.as_deref(), Some("3"));
        assert_eq!(header.booth_name.as_deref(), Some("प्राथमिक विद्यालय"));
    }

    #[test]
    fn test_code_style_header() {
        let header = parse_header("ST_CODE: S04   AC_NO: 11   PART NO. 7");
        assert_eq!(header.state_code.as_deref(), Some("S04"));
        assert_eq!(header.ac_no.as_deref(), Some("11"));
        assert_eq!(header.part_no.as_deref(), Some("7"));
        assert_eq!(header.booth_name, None);
    }

    #[test]
    fn test_column_titles_are_not_header_values() {
        let header = parse_header("ST_CODE AC_NO PART_NO SLNOINPART C_HOUSE_NO");
        assert!(header.is_empty());
    }
}
