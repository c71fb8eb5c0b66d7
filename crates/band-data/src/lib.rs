//! Parsing for the festival-guide datasets.
//!
//! All four remote datasets arrive as small text files: a `key=url` pointer
//! manifest and three CSVs (bands, schedule, descriptions). Parsers are
//! tolerant at the row level (malformed rows are skipped with a warning) and
//! strict at the header level (a dataset missing its required columns fails
//! so the previously parsed structures stay in place).

pub mod bands;
pub mod descriptions;
pub mod error;
pub mod pointer;
pub mod schedule;
pub mod table;

pub use bands::{BandList, BandRecord};
pub use descriptions::DescriptionMap;
pub use error::{ParseError, Result};
pub use pointer::PointerManifest;
pub use schedule::{EventType, ScheduleEntry, ScheduleIndex};
