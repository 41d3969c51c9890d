// src/schema/measure.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A LAUS measure. Every series identifier ends in a two-character measure
/// code; only these four are published at county level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measure {
    UnemploymentRate,
    Unemployment,
    Employment,
    LaborForce,
}

impl Measure {
    /// All measures, in measure-code order.
    pub const ALL: [Measure; 4] = [
        Measure::UnemploymentRate,
        Measure::Unemployment,
        Measure::Employment,
        Measure::LaborForce,
    ];

    /// The order measures appear as columns in the output table.
    pub const OUTPUT_ORDER: [Measure; 4] = [
        Measure::Employment,
        Measure::LaborForce,
        Measure::Unemployment,
        Measure::UnemploymentRate,
    ];

    /// Look up the measure for a two-character series suffix.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "03" => Some(Measure::UnemploymentRate),
            "04" => Some(Measure::Unemployment),
            "05" => Some(Measure::Employment),
            "06" => Some(Measure::LaborForce),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Measure::UnemploymentRate => "03",
            Measure::Unemployment => "04",
            Measure::Employment => "05",
            Measure::LaborForce => "06",
        }
    }

    /// Column header used for this measure in the wide table.
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::UnemploymentRate => "Unemployment_Rate",
            Measure::Unemployment => "Unemployment",
            Measure::Employment => "Employment",
            Measure::LaborForce => "Labor_Force",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_is_fixed() {
        assert_eq!(Measure::from_code("03"), Some(Measure::UnemploymentRate));
        assert_eq!(Measure::from_code("04"), Some(Measure::Unemployment));
        assert_eq!(Measure::from_code("05"), Some(Measure::Employment));
        assert_eq!(Measure::from_code("06"), Some(Measure::LaborForce));

        assert_eq!(
            Measure::ALL.map(Measure::column_name),
            ["Unemployment_Rate", "Unemployment", "Employment", "Labor_Force"]
        );
    }

    #[test]
    fn test_other_codes_have_no_column() {
        for code in ["00", "01", "02", "07", "08", "13", "99", "3", "003", "", "AB"] {
            assert_eq!(Measure::from_code(code), None, "code {:?}", code);
        }
    }

    #[test]
    fn test_code_round_trips() {
        for m in Measure::ALL {
            assert_eq!(Measure::from_code(m.code()), Some(m));
        }
    }
}
