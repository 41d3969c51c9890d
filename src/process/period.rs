// src/process/period.rs

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// `M` followed by exactly two digits.
static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^M(\d{2})$").expect("period pattern should compile"));

/// Pseudo-month BLS uses for the annual average.
pub const ANNUAL_AVERAGE_MONTH: u8 = 13;

/// A normalized LAUS period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Calendar month, 1..=12.
    Month(u8),
    /// `M13`: the yearly mean, never mixed into monthly series.
    AnnualAverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("period `{0}` is not a month code M01..M13")]
pub struct PeriodError(pub String);

impl Period {
    pub fn parse(raw: &str) -> Result<Self, PeriodError> {
        let caps = PERIOD_RE
            .captures(raw.trim())
            .ok_or_else(|| PeriodError(raw.to_string()))?;
        let n: u8 = caps[1]
            .parse()
            .map_err(|_| PeriodError(raw.to_string()))?;

        match n {
            1..=12 => Ok(Period::Month(n)),
            ANNUAL_AVERAGE_MONTH => Ok(Period::AnnualAverage),
            _ => Err(PeriodError(raw.to_string())),
        }
    }

    pub fn month(self) -> Option<u8> {
        match self {
            Period::Month(m) => Some(m),
            Period::AnnualAverage => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_map_exactly() {
        for m in 1..=12u8 {
            let raw = format!("M{:02}", m);
            assert_eq!(Period::parse(&raw), Ok(Period::Month(m)));
        }
    }

    #[test]
    fn test_m13_is_annual_average() {
        assert_eq!(Period::parse("M13"), Ok(Period::AnnualAverage));
        assert_eq!(Period::AnnualAverage.month(), None);
    }

    #[test]
    fn test_malformed_periods_are_rejected() {
        for raw in ["M00", "M14", "M99", "M1", "M001", "Q01", "m01", "", "13", "M1a"] {
            assert_eq!(
                Period::parse(raw),
                Err(PeriodError(raw.to_string())),
                "period {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(Period::parse(" M07 "), Ok(Period::Month(7)));
    }
}
