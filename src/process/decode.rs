// src/process/decode.rs

use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use super::period::{Period, PeriodError};
use super::raw_table::RawRecord;
use crate::schema::{AreaType, Measure};

/// Layout of a LAUS series identifier:
///
/// ```text
/// LAU CN0100100000000 03
/// ^^^ ^^^^^^^^^^^^^^^ ^^
/// |   area code       measure code
/// prefix (survey + seasonal adjustment)
/// ```
///
/// The FIPS fragment sits at offset 2 of the area code, after the two-letter
/// area-type marker.
pub const PREFIX_LEN: usize = 3;
pub const MEASURE_CODE_LEN: usize = 2;
pub const FIPS_OFFSET: usize = 2;
pub const FIPS_LEN: usize = 5;

/// Shortest identifier body (area code + measure code) accepted once the prefix is stripped.
const MIN_BODY_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("series id `{0}` is too short")]
    TooShort(String),
    #[error("series id `{0}` contains non-ASCII characters")]
    NonAscii(String),
    #[error("area code `{0}` is too short to hold a FIPS code")]
    MissingFips(String),
}

/// The three fields carried by a series identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesId {
    pub prefix: String,
    pub area_code: String,
    pub measure_code: String,
}

impl SeriesId {
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        let id = raw.trim();
        if !id.is_ascii() {
            return Err(DecodeError::NonAscii(id.to_string()));
        }
        if id.len() < PREFIX_LEN + MIN_BODY_LEN {
            return Err(DecodeError::TooShort(id.to_string()));
        }

        let split = id.len() - MEASURE_CODE_LEN;
        let area_code = &id[PREFIX_LEN..split];
        if area_code.len() < FIPS_OFFSET + FIPS_LEN {
            return Err(DecodeError::MissingFips(area_code.to_string()));
        }

        Ok(Self {
            prefix: id[..PREFIX_LEN].to_string(),
            area_code: area_code.to_string(),
            measure_code: id[split..].to_string(),
        })
    }

    pub fn fips(&self) -> &str {
        &self.area_code[FIPS_OFFSET..FIPS_OFFSET + FIPS_LEN]
    }

    pub fn measure(&self) -> Option<Measure> {
        Measure::from_code(&self.measure_code)
    }

    /// Reassemble the identifier.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.prefix, self.area_code, self.measure_code)
    }
}

/// A record that survived decoding: county-level, monthly, known measure.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub area_code: String,
    pub fips: String,
    pub measure: Measure,
    pub year: i32,
    pub month: u8,
    /// `None` when the published value is not numeric (e.g. `-`).
    pub value: Option<f64>,
}

/// Why a raw record did not produce a `DecodedRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Malformed(DecodeError),
    /// Area code lacks the configured area-type marker.
    NotCounty,
    AnnualAverage,
    BadPeriod(PeriodError),
    UnknownMeasure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Record(DecodedRecord),
    Skipped(SkipReason),
}

/// Tally of decode outcomes for one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub read: usize,
    pub decoded: usize,
    pub malformed: usize,
    pub not_county: usize,
    pub annual_average: usize,
    pub bad_period: usize,
    pub unknown_measure: usize,
    /// Decoded records whose value could not be coerced to a number.
    pub missing_value: usize,
}

impl DecodeStats {
    fn record(&mut self, outcome: &Decoded) {
        self.read += 1;
        match outcome {
            Decoded::Record(rec) => {
                self.decoded += 1;
                if rec.value.is_none() {
                    self.missing_value += 1;
                }
            }
            Decoded::Skipped(SkipReason::Malformed(_)) => self.malformed += 1,
            Decoded::Skipped(SkipReason::NotCounty) => self.not_county += 1,
            Decoded::Skipped(SkipReason::AnnualAverage) => self.annual_average += 1,
            Decoded::Skipped(SkipReason::BadPeriod(_)) => self.bad_period += 1,
            Decoded::Skipped(SkipReason::UnknownMeasure(_)) => self.unknown_measure += 1,
        }
    }
}

/// Turns raw records into decoded, area-filtered records.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesDecoder {
    area_type: AreaType,
}

impl SeriesDecoder {
    pub fn new(area_type: AreaType) -> Self {
        Self { area_type }
    }

    pub fn decode(&self, raw: &RawRecord) -> Decoded {
        let id = match SeriesId::parse(&raw.series_id) {
            Ok(id) => id,
            Err(e) => return Decoded::Skipped(SkipReason::Malformed(e)),
        };
        if !self.area_type.matches(&id.area_code) {
            return Decoded::Skipped(SkipReason::NotCounty);
        }
        let month = match Period::parse(&raw.period) {
            Ok(Period::Month(m)) => m,
            Ok(Period::AnnualAverage) => return Decoded::Skipped(SkipReason::AnnualAverage),
            Err(e) => return Decoded::Skipped(SkipReason::BadPeriod(e)),
        };
        let Some(measure) = id.measure() else {
            return Decoded::Skipped(SkipReason::UnknownMeasure(id.measure_code));
        };

        Decoded::Record(DecodedRecord {
            fips: id.fips().to_string(),
            area_code: id.area_code,
            measure,
            year: raw.year,
            month,
            value: coerce_value(&raw.value),
        })
    }

    /// Decode a whole chunk, keeping only usable records, in source order.
    pub fn decode_all(&self, records: &[RawRecord]) -> (Vec<DecodedRecord>, DecodeStats) {
        let mut stats = DecodeStats::default();
        let mut out = Vec::with_capacity(records.len() / 4);

        for raw in records {
            let outcome = self.decode(raw);
            stats.record(&outcome);
            match outcome {
                Decoded::Record(rec) => out.push(rec),
                Decoded::Skipped(SkipReason::NotCounty) => {}
                Decoded::Skipped(reason) => {
                    trace!(series_id = %raw.series_id, ?reason, "skipped record");
                }
            }
        }

        (out, stats)
    }
}

/// Numeric value or `None`; never an error.
pub fn coerce_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
