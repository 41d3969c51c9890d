// src/output/mod.rs
//! Export of the assembled dataset.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::info;

use crate::config::OutputFormat;
use crate::process::Dataset;

mod parquet_file;
mod table;

pub use parquet_file::write_parquet;
pub use table::write_csv;

fn write_to(dataset: &Dataset, path: &Path, format: OutputFormat) -> Result<usize> {
    match format {
        OutputFormat::Csv => {
            let file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_csv(dataset, file)
        }
        OutputFormat::Parquet => write_parquet(dataset, path),
    }
}

/// Write `dataset` to `path` in `format`, via a temporary file renamed into
/// place. Returns the number of rows written.
pub fn write_dataset(dataset: &Dataset, path: &Path, format: OutputFormat) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let result = write_to(dataset, &tmp_path, format).and_then(|rows| {
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
        Ok(rows)
    });
    let rows = match result {
        Ok(rows) => rows,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };
    info!(rows, path = %path.display(), ?format, "dataset written");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_dataset_replaces_target() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("out.csv");
        fs::create_dir_all(dir.path().join("nested"))?;
        fs::write(&path, "stale")?;

        assert_eq!(write_dataset(&Dataset::default(), &path, OutputFormat::Csv)?, 0);

        assert!(fs::read_to_string(&path)?.starts_with("FIPS,"));
        assert!(!dir.path().join("nested").join(".out.csv.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_failed_rename_removes_tmp_file() -> Result<()> {
        let dir = tempdir()?;
        // a non-empty directory cannot be replaced by a file
        let path = dir.path().join("out.csv");
        fs::create_dir(&path)?;
        fs::write(path.join("keep"), "x")?;

        assert!(write_dataset(&Dataset::default(), &path, OutputFormat::Csv).is_err());
        assert!(!dir.path().join(".out.csv.tmp").exists());
        Ok(())
    }
}
