// src/schema/columns.rs

/// Column layout of a `la.data.*` chunk feed, in order.
pub const DATA_COLUMNS: [&str; 5] = ["series_id", "year", "period", "value", "footnote_codes"];

/// Columns of the `la.area` reference feed that are consumed.
pub const AREA_CODE_COLUMN: &str = "area_code";
pub const AREA_TEXT_COLUMN: &str = "area_text";

/// Header of the exported county table.
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "FIPS",
    "state",
    "countyname",
    "year",
    "month",
    "Employment",
    "Labor_Force",
    "Unemployment",
    "Unemployment_Rate",
];
