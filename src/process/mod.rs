//! The decode and reshape core: pure transformations over records that are
//! already in memory.
//!
//! `raw_table` → `decode` (+ `period`) → `reshape` (joined with `area`) →
//! `assemble`.

pub mod area;
pub mod assemble;
pub mod decode;
pub mod period;
pub mod raw_table;
pub mod reshape;

pub use area::{AreaCatalog, AreaEntry};
pub use assemble::{assemble, Dataset};
pub use decode::{DecodeError, DecodeStats, Decoded, DecodedRecord, SeriesDecoder, SeriesId, SkipReason};
pub use period::{Period, PeriodError};
pub use raw_table::{read_raw_table, RawRecord, RawTable};
pub use reshape::{reshape, CountyObservation, ReshapeStats};
