//! Bulk LAUS county employment scraper.
//!
//! Downloads the BLS `la.data.0.CurrentU*` and `la.area` flat files, decodes
//! the series identifiers, keeps the county-level monthly records and
//! reshapes them into one row per county and month.

pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod schema;

pub use config::{ChunkPlan, ChunkRange, OutputFormat, PipelineConfig};
pub use error::IngestError;
pub use pipeline::{Pipeline, RunOutput, RunSummary};
pub use process::{CountyObservation, Dataset};
