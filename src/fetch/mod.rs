// src/fetch/mod.rs
//! Getting BLS flat files onto local disk. The core never calls into this
//! module; it only reads what has already been stored under the data dir.

use anyhow::Result;
use std::future::Future;

pub mod files;
pub mod urls;

pub use files::{ensure_local, fetch_missing, FetchOutcome, HttpAcquisition};

/// A source of raw file content, addressed by BLS file identifier
/// (e.g. `la.area`, `la.data.0.CurrentU90-94`).
pub trait Acquisition: Sync {
    fn fetch(&self, file_id: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
