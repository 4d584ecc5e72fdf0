//! Roll header metadata (state, constituency, polling station).

use serde::Serialize;

/// Values printed in a roll's page header.
///
/// Every field is optional; pages rarely repeat all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollHeader {
    /// State code such as `S04`
    pub state_code: Option<String>,
    /// State name when the header spells it out instead of a code
    pub state_name: Option<String>,
    /// Assembly constituency number
    pub ac_no: Option<String>,
    /// Assembly constituency name
    pub ac_name: Option<String>,
    /// Part (polling station) number
    pub part_no: Option<String>,
    /// Polling station name
    pub booth_name: Option<String>,
}

impl RollHeader {
    /// Fill fields still missing here from `other`; existing values win.
    pub fn merge(&mut self, other: RollHeader) {
        fill(&mut self.state_code, other.state_code);
        fill(&mut self.state_name, other.state_name);
        fill(&mut self.ac_no, other.ac_no);
        fill(&mut self.ac_name, other.ac_name);
        fill(&mut self.part_no, other.part_no);
        fill(&mut self.booth_name, other.booth_name);
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == RollHeader::default()
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_first_value_wins() {
        let mut header = RollHeader {
            ac_no: Some("11".into()),
            ..Default::default()
        };
        header.merge(RollHeader {
            ac_no: Some("99".into()),
            part_no: Some("1".into()),
            ..Default::default()
        });

        assert_eq!(header.ac_no.as_deref(), Some("11"));
        assert_eq!(header.part_no.as_deref(), Some("1"));
        assert!(!header.is_empty());
        assert!(RollHeader::default().is_empty());
    }
}
