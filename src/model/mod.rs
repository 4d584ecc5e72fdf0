//! Data model for extracted electoral rolls.
//!
//! Records flow from the record parser into an [`ExtractionBatch`] per
//! source document; the batch is written out and summarized as an
//! [`ExtractionResult`].

mod batch;
mod header;
mod record;
mod result;

pub use batch::ExtractionBatch;
pub use header::RollHeader;
pub use record::{CellValue, Column, Gender, RawRecord, RelationType, ValidationWarning, VoterRecord};
pub use result::{ExtractionResult, Issue, IssueKind};
