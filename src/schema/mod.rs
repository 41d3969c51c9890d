pub mod area;
pub mod arrow;
pub mod columns;
pub mod measure;

pub use area::AreaType;
pub use self::arrow::build_arrow_schema;
pub use columns::{AREA_CODE_COLUMN, AREA_TEXT_COLUMN, DATA_COLUMNS, OUTPUT_COLUMNS};
pub use measure::Measure;
