// src/schema/area.rs

use serde::{Deserialize, Serialize};

/// LAUS geography levels and the two-letter marker each one carries inside
/// an area code (e.g. `CN0100100000000` is a county).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    State,
    MetropolitanArea,
    MetropolitanDivision,
    MicropolitanArea,
    CombinedArea,
    #[default]
    County,
    City,
    CityOrTown,
}

impl AreaType {
    pub fn marker(self) -> &'static str {
        match self {
            AreaType::State => "ST",
            AreaType::MetropolitanArea => "MT",
            AreaType::MetropolitanDivision => "DV",
            AreaType::MicropolitanArea => "MC",
            AreaType::CombinedArea => "CA",
            AreaType::County => "CN",
            AreaType::City => "CT",
            AreaType::CityOrTown => "CS",
        }
    }

    /// True when `area_code` belongs to this geography level.
    pub fn matches(self, area_code: &str) -> bool {
        area_code.contains(self.marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_county_marker() {
        assert_eq!(AreaType::default(), AreaType::County);
        assert!(AreaType::County.matches("CN0100100000000"));
        assert!(!AreaType::County.matches("ST0100000000000"));
        assert!(!AreaType::County.matches("MT0111500000000"));
        assert!(AreaType::State.matches("ST0100000000000"));
    }
}
