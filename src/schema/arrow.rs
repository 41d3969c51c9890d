// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::columns::OUTPUT_COLUMNS;

/// Map an output column to its Arrow type.
///
/// - FIPS, state, countyname → Utf8
/// - year                    → Int32
/// - month                   → UInt8
/// - measures                → Float64 (nullable)
pub fn map_to_arrow_type(column: &str) -> DataType {
    match column {
        "FIPS" | "state" | "countyname" => DataType::Utf8,
        "year" => DataType::Int32,
        "month" => DataType::UInt8,
        _ => DataType::Float64,
    }
}

/// Build the ArrowSchema (inside an Arc) of the exported county table.
/// Only `state` and the measure columns may be null.
pub fn build_arrow_schema() -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = OUTPUT_COLUMNS
        .iter()
        .map(|&name| {
            let nullable = !matches!(name, "FIPS" | "countyname" | "year" | "month");
            ArrowField::new(name, map_to_arrow_type(name), nullable)
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}
