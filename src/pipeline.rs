// src/pipeline.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{info, instrument};

use crate::config::{local_path, ChunkPlan, ChunkRange, PipelineConfig, AREA_FILE_ID};
use crate::error::IngestError;
use crate::process::{
    assemble, read_raw_table, reshape, AreaCatalog, CountyObservation, Dataset, DecodeStats,
    RawTable, ReshapeStats, SeriesDecoder,
};
use crate::schema::AreaType;

/// What happened to the records of one data feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub file_id: String,
    pub malformed_rows: usize,
    pub decode: DecodeStats,
    pub reshape: ReshapeStats,
}

/// Decode and reshape one chunk that is already in memory.
pub fn process_raw_table(
    table: &RawTable,
    decoder: &SeriesDecoder,
    catalog: &AreaCatalog,
) -> (Vec<CountyObservation>, ChunkReport) {
    let (decoded, decode_stats) = decoder.decode_all(&table.records);
    let (observations, reshape_stats) = reshape(&decoded, catalog);

    let report = ChunkReport {
        file_id: table.file_id.clone(),
        malformed_rows: table.malformed_rows,
        decode: decode_stats,
        reshape: reshape_stats,
    };
    (observations, report)
}

pub struct RunOutput {
    pub dataset: Dataset,
    pub reports: Vec<ChunkReport>,
}

/// Reads the stored feeds under `data_dir` and builds the county dataset.
pub struct Pipeline {
    data_dir: PathBuf,
    chunks: ChunkPlan,
    decoder: SeriesDecoder,
}

impl Pipeline {
    pub fn new(data_dir: impl Into<PathBuf>, chunks: ChunkPlan) -> Self {
        Self {
            data_dir: data_dir.into(),
            chunks,
            decoder: SeriesDecoder::new(AreaType::County),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.data_dir.clone(), config.chunks.clone())
    }

    pub fn load_catalog(&self) -> Result<AreaCatalog, IngestError> {
        let file = open_input(&self.data_dir, AREA_FILE_ID)?;
        AreaCatalog::from_reader(BufReader::new(file), AREA_FILE_ID, AreaType::County)
    }

    #[instrument(level = "info", skip(self, chunk, catalog), fields(chunk = %chunk))]
    pub fn process_chunk(
        &self,
        chunk: &ChunkRange,
        catalog: &AreaCatalog,
    ) -> Result<(Vec<CountyObservation>, ChunkReport), IngestError> {
        let start = Instant::now();
        let file_id = chunk.file_id();
        let file = open_input(&self.data_dir, &file_id)?;
        let table = read_raw_table(BufReader::new(file), &file_id)?;
        let (observations, report) = process_raw_table(&table, &self.decoder, catalog);

        info!(
            records = report.decode.read,
            decoded = report.decode.decoded,
            unmatched = report.reshape.unmatched,
            empty = report.reshape.empty,
            observations = observations.len(),
            elapsed = ?start.elapsed(),
            "chunk processed"
        );
        Ok((observations, report))
    }

    /// Process every chunk (in parallel) and assemble the sorted dataset.
    /// Any missing or unreadable feed fails the whole run.
    pub fn run(&self) -> Result<RunOutput, IngestError> {
        let catalog = self.load_catalog()?;
        info!(
            areas = catalog.len(),
            chunks = self.chunks.len(),
            "area catalog loaded"
        );

        let results: Vec<(Vec<CountyObservation>, ChunkReport)> = self
            .chunks
            .ranges()
            .par_iter()
            .map(|chunk| self.process_chunk(chunk, &catalog))
            .collect::<Result<_, _>>()?;

        let (per_chunk, reports): (Vec<_>, Vec<_>) = results.into_iter().unzip();
        let dataset = assemble(per_chunk);
        info!(rows = dataset.len(), "dataset assembled");

        Ok(RunOutput { dataset, reports })
    }
}

fn open_input(data_dir: &Path, file_id: &str) -> Result<File, IngestError> {
    let path = local_path(data_dir, file_id);
    File::open(&path).map_err(|source| IngestError::MissingInput {
        file_id: file_id.to_string(),
        path,
        source,
    })
}

/// Machine-readable record of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub output: PathBuf,
    pub rows_written: usize,
    pub chunks: Vec<ChunkReport>,
}

impl RunSummary {
    /// Write as pretty JSON: to a tmp file, then rename over `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let mut tmp = File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        serde_json::to_writer_pretty(&mut tmp, self).context("serializing run summary")?;
        tmp.write_all(b"\n")?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
        Ok(())
    }
}
