// src/process/raw_table.rs

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use tracing::{debug, trace};

use crate::error::IngestError;
use crate::schema::DATA_COLUMNS;

/// One line of a `la.data.*` feed, exactly as published (fields trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub series_id: String,
    pub year: i32,
    /// `"M01"`..`"M12"`, or `"M13"` for the annual average.
    pub period: String,
    pub value: String,
    /// Passed through, never interpreted.
    pub footnote_codes: String,
}

impl RawRecord {
    pub fn new(
        series_id: impl Into<String>,
        year: i32,
        period: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            year,
            period: period.into(),
            value: value.into(),
            footnote_codes: String::new(),
        }
    }
}

/// All records of one data feed.
#[derive(Debug, Default)]
pub struct RawTable {
    pub file_id: String,
    pub records: Vec<RawRecord>,
    /// Lines that are not UTF-8, have the wrong number of fields or a
    /// non-integer year.
    pub malformed_rows: usize,
}

/// Tab-delimited reader configured the way BLS publishes its flat files:
/// a header row, space-padded fields, no quoting.
pub(crate) fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(reader)
}

/// Read a data chunk feed. The header must be exactly
/// `series_id, year, period, value, footnote_codes`; individual bad lines are
/// counted and skipped.
#[tracing::instrument(level = "debug", skip(reader))]
pub fn read_raw_table<R: Read>(reader: R, file_id: &str) -> Result<RawTable, IngestError> {
    let mut rdr = tsv_reader(reader);
    let found: Vec<String> = rdr
        .headers()
        .map_err(|source| IngestError::Csv {
            file_id: file_id.to_string(),
            source,
        })?
        .iter()
        .map(str::to_string)
        .collect();

    if found != DATA_COLUMNS {
        return Err(IngestError::BadHeader {
            file_id: file_id.to_string(),
            expected: DATA_COLUMNS.iter().map(|c| c.to_string()).collect(),
            found,
        });
    }

    let mut table = RawTable {
        file_id: file_id.to_string(),
        ..Default::default()
    };

    for (idx, result) in rdr.byte_records().enumerate() {
        let bytes = result.map_err(|source| IngestError::Csv {
            file_id: file_id.to_string(),
            source,
        })?;
        let record = match StringRecord::from_byte_record(bytes) {
            Ok(record) => record,
            Err(e) => {
                trace!(line = idx + 2, "invalid utf-8: {}", e.utf8_error());
                table.malformed_rows += 1;
                continue;
            }
        };

        // the trailing footnote field is dropped by some mirrors
        if !(4..=5).contains(&record.len()) {
            trace!(line = idx + 2, fields = record.len(), "wrong field count");
            table.malformed_rows += 1;
            continue;
        }
        let Ok(year) = record[1].parse::<i32>() else {
            trace!(line = idx + 2, year = &record[1], "year is not an integer");
            table.malformed_rows += 1;
            continue;
        };

        table.records.push(RawRecord {
            series_id: record[0].to_string(),
            year,
            period: record[2].to_string(),
            value: record[3].to_string(),
            footnote_codes: record.get(4).unwrap_or_default().to_string(),
        });
    }

    debug!(
        records = table.records.len(),
        malformed = table.malformed_rows,
        "read raw table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_padded_bls_layout() {
        let content = "series_id                     \tyear\tperiod\t       value\tfootnote_codes\n\
                       LAUCN010010000000003          \t2015\tM01\t         5.2\t\n\
                       LAUCN010010000000004          \t2015\tM01\t        1000\tP\n";
        let table = read_raw_table(content.as_bytes(), "la.data.0.CurrentU15-19").unwrap();

        assert_eq!(table.malformed_rows, 0);
        assert_eq!(
            table.records,
            vec![
                RawRecord::new("LAUCN010010000000003", 2015, "M01", "5.2"),
                RawRecord {
                    footnote_codes: "P".into(),
                    ..RawRecord::new("LAUCN010010000000004", 2015, "M01", "1000")
                },
            ]
        );
    }

    #[test]
    fn test_bad_lines_are_counted_not_fatal() {
        let content = "series_id\tyear\tperiod\tvalue\tfootnote_codes\n\
                       LAUCN010010000000003\tabcd\tM01\t5.2\t\n\
                       LAUCN010010000000003\t2015\n\
                       LAUCN010010000000003\t2015\tM02\t5.0\t\n";
        let table = read_raw_table(content.as_bytes(), "chunk").unwrap();

        assert_eq!(table.malformed_rows, 2);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].period, "M02");
    }

    #[test]
    fn test_invalid_utf8_line_is_counted_not_fatal() {
        let mut content = b"series_id\tyear\tperiod\tvalue\tfootnote_codes\n\
                            LAUCN010010000000003\t2015\tM01\t5.2\t\n"
            .to_vec();
        content.extend_from_slice(b"LAUCN010010000000003\t2015\tM02\t5.\xff\t\n");
        content.extend_from_slice(b"LAUCN010010000000003\t2015\tM03\t5.0\t\n");

        let table = read_raw_table(content.as_slice(), "chunk").unwrap();

        assert_eq!(table.malformed_rows, 1);
        let periods: Vec<&str> = table.records.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["M01", "M03"]);
    }

    #[test]
    fn test_wrong_header_is_fatal() {
        let content = "series_id\tyear\tvalue\tperiod\n";
        let err = read_raw_table(content.as_bytes(), "la.data.0.CurrentU90-94").unwrap_err();

        match err {
            IngestError::BadHeader { file_id, found, .. } => {
                assert_eq!(file_id, "la.data.0.CurrentU90-94");
                assert_eq!(found, vec!["series_id", "year", "value", "period"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_feed_is_fatal() {
        let err = read_raw_table("".as_bytes(), "chunk").unwrap_err();
        assert!(matches!(err, IngestError::BadHeader { .. }));
    }
}
