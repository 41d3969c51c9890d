// src/output/parquet_file.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray, UInt8Array},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties,
};
use std::{fs::File, path::Path, sync::Arc};

use crate::process::Dataset;
use crate::schema::{build_arrow_schema, Measure};

fn to_record_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let obs = &dataset.observations;

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(obs.iter().map(|o| o.fips.as_str()))),
        Arc::new(StringArray::from_iter(obs.iter().map(|o| o.state.as_deref()))),
        Arc::new(StringArray::from_iter_values(obs.iter().map(|o| o.countyname.as_str()))),
        Arc::new(Int32Array::from_iter_values(obs.iter().map(|o| o.year))),
        Arc::new(UInt8Array::from_iter_values(obs.iter().map(|o| o.month))),
    ];
    for measure in Measure::OUTPUT_ORDER {
        columns.push(Arc::new(Float64Array::from_iter(
            obs.iter().map(|o| o.get(measure)),
        )));
    }

    RecordBatch::try_new(build_arrow_schema(), columns).context("building output record batch")
}

/// Write the dataset as a single Snappy-compressed Parquet file.
pub fn write_parquet(dataset: &Dataset, path: &Path) -> Result<usize> {
    let batch = to_record_batch(dataset)?;

    let file =
        File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    Ok(batch.num_rows())
}
