// src/config.rs

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://download.bls.gov/pub/time.series/la/";
/// Geography reference feed.
pub const AREA_FILE_ID: &str = "la.area";
/// Data feeds are `la.data.0.CurrentU<yy>-<yy>`, unadjusted, five years each.
pub const DATA_FILE_PREFIX: &str = "la.data.0.CurrentU";
/// First year of the county series.
pub const FIRST_YEAR: i32 = 1990;
const BLOCK_YEARS: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chunk range `{0}`, expected a year range such as 90-94")]
pub struct ChunkRangeError(pub String);

/// An inclusive range of years covered by one data feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChunkRange {
    start_year: i32,
    end_year: i32,
}

impl ChunkRange {
    pub fn new(start_year: i32, end_year: i32) -> Result<Self, ChunkRangeError> {
        if end_year < start_year {
            return Err(ChunkRangeError(format!("{}-{}", start_year, end_year)));
        }
        Ok(Self {
            start_year,
            end_year,
        })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    /// Two-digit label used in BLS file names, e.g. `00-04`.
    pub fn label(&self) -> String {
        format!("{:02}-{:02}", self.start_year % 100, self.end_year % 100)
    }

    pub fn file_id(&self) -> String {
        format!("{}{}", DATA_FILE_PREFIX, self.label())
    }
}

/// Two-digit years pivot at 1970; LAUS has nothing earlier.
fn expand_year(raw: &str) -> Option<i32> {
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if n >= 70 => Some(1900 + n),
        2 => Some(2000 + n),
        4 => Some(n),
        _ => None,
    }
}

impl FromStr for ChunkRange {
    type Err = ChunkRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ChunkRangeError(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(err)?;
        let start = expand_year(start.trim()).ok_or_else(err)?;
        let end = expand_year(end.trim()).ok_or_else(err)?;
        Self::new(start, end).map_err(|_| err())
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl TryFrom<String> for ChunkRange {
    type Error = ChunkRangeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChunkRange> for String {
    fn from(r: ChunkRange) -> Self {
        r.label()
    }
}

/// The data feeds a run covers, in the order they are assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkPlan(Vec<ChunkRange>);

impl ChunkPlan {
    pub fn new(ranges: Vec<ChunkRange>) -> Self {
        Self(ranges)
    }

    /// Five-year blocks aligned the way BLS splits its files
    /// (`90-94`, `95-99`, `00-04`, ...) covering `first_year..=last_year`.
    pub fn five_year_blocks(first_year: i32, last_year: i32) -> Self {
        let mut ranges = Vec::new();
        let mut start = first_year - first_year.rem_euclid(BLOCK_YEARS);
        while start <= last_year {
            ranges.push(ChunkRange {
                start_year: start,
                end_year: start + BLOCK_YEARS - 1,
            });
            start += BLOCK_YEARS;
        }
        Self(ranges)
    }

    /// Every block from 1990 through the current calendar year.
    pub fn through_current_year() -> Self {
        Self::five_year_blocks(FIRST_YEAR, Utc::now().year())
    }

    pub fn ranges(&self) -> &[ChunkRange] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn file_ids(&self) -> Vec<String> {
        self.0.iter().map(ChunkRange::file_id).collect()
    }
}

impl Default for ChunkPlan {
    fn default() -> Self {
        Self::through_current_year()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    /// Guess from a file extension; `None` when it is neither.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "parquet" => Some(OutputFormat::Parquet),
            _ => None,
        }
    }
}

/// Everything a run needs. Loaded from YAML, then overridden from the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub base_url: String,
    /// BLS refuses requests without an identifying agent; put a contact in it.
    pub user_agent: String,
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub chunks: ChunkPlan,
    /// Maximum simultaneous downloads.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("lauscraper/{}", env!("CARGO_PKG_VERSION")),
            data_dir: PathBuf::from("data"),
            output: PathBuf::from("BLS_county_employment.csv"),
            format: OutputFormat::Csv,
            chunks: ChunkPlan::default(),
            concurrency: 3,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parsing pipeline config")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Every file a run reads: the data chunks, then the area feed.
    pub fn file_ids(&self) -> Vec<String> {
        let mut ids = self.chunks.file_ids();
        ids.push(AREA_FILE_ID.to_string());
        ids
    }

    pub fn local_path(&self, file_id: &str) -> PathBuf {
        local_path(&self.data_dir, file_id)
    }
}

/// Where a downloaded feed is stored under `data_dir`.
pub fn local_path(data_dir: &Path, file_id: &str) -> PathBuf {
    data_dir.join(format!("{}.txt", file_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_range_parse_and_label() {
        let r: ChunkRange = "90-94".parse().unwrap();
        assert_eq!((r.start_year(), r.end_year()), (1990, 1994));
        assert_eq!(r.file_id(), "la.data.0.CurrentU90-94");

        let r: ChunkRange = "00-04".parse().unwrap();
        assert_eq!((r.start_year(), r.end_year()), (2000, 2004));
        assert_eq!(r.label(), "00-04");
        assert!(r.contains(2003));
        assert!(!r.contains(2005));

        let r: ChunkRange = "2015-2019".parse().unwrap();
        assert_eq!(r.label(), "15-19");
    }

    #[test]
    fn test_chunk_range_rejects_garbage() {
        for raw in ["", "90", "94-90", "9a-94", "1990-94x", "-"] {
            assert!(raw.parse::<ChunkRange>().is_err(), "{:?}", raw);
        }
    }

    #[test]
    fn test_five_year_blocks() {
        let plan = ChunkPlan::five_year_blocks(1990, 2017);
        assert_eq!(
            plan.file_ids(),
            vec![
                "la.data.0.CurrentU90-94",
                "la.data.0.CurrentU95-99",
                "la.data.0.CurrentU00-04",
                "la.data.0.CurrentU05-09",
                "la.data.0.CurrentU10-14",
                "la.data.0.CurrentU15-19",
            ]
        );

        // an unaligned start still lands on BLS block boundaries
        let plan = ChunkPlan::five_year_blocks(1992, 1995);
        let labels: Vec<String> = plan.ranges().iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["90-94", "95-99"]);
    }

    #[test]
    fn test_default_plan_runs_through_current_year() {
        let plan = ChunkPlan::default();
        let first = plan.ranges().first().unwrap();
        let last = plan.ranges().last().unwrap();

        assert_eq!(first.label(), "90-94");
        assert!(last.contains(Utc::now().year()));
        assert_eq!(PipelineConfig::default().chunks, plan);
    }

    #[test]
    fn test_yaml_config_with_defaults() {
        let cfg = PipelineConfig::from_yaml_str(
            "data_dir: /tmp/laus\nformat: parquet\nchunks: [\"90-94\", \"95-99\"]\n",
        )
        .unwrap();

        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/laus"));
        assert_eq!(cfg.format, OutputFormat::Parquet);
        assert_eq!(cfg.chunks.len(), 2);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            cfg.file_ids(),
            vec!["la.data.0.CurrentU90-94", "la.data.0.CurrentU95-99", "la.area"]
        );
        assert_eq!(
            cfg.local_path("la.area"),
            PathBuf::from("/tmp/laus/la.area.txt")
        );
    }

    #[test]
    fn test_yaml_config_rejects_bad_chunk() {
        assert!(PipelineConfig::from_yaml_str("chunks: [\"nope\"]\n").is_err());
        assert!(PipelineConfig::from_yaml_str("unknown_key: 1\n").is_err());
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/x.PARQUET")),
            Some(OutputFormat::Parquet)
        );
        assert_eq!(OutputFormat::from_path(Path::new("x.csv")), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_path(Path::new("x")), None);
    }
}
