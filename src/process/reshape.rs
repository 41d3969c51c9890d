// src/process/reshape.rs

use serde::Serialize;
use std::collections::HashMap;

use super::area::AreaCatalog;
use super::decode::DecodedRecord;
use crate::schema::Measure;

/// One county-month in wide form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyObservation {
    pub area_code: String,
    pub fips: String,
    pub state: Option<String>,
    pub countyname: String,
    pub year: i32,
    pub month: u8,
    pub employment: Option<f64>,
    pub labor_force: Option<f64>,
    pub unemployment: Option<f64>,
    pub unemployment_rate: Option<f64>,
}

impl CountyObservation {
    pub fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Employment => self.employment,
            Measure::LaborForce => self.labor_force,
            Measure::Unemployment => self.unemployment,
            Measure::UnemploymentRate => self.unemployment_rate,
        }
    }

    fn set(&mut self, measure: Measure, value: Option<f64>) {
        let slot = match measure {
            Measure::Employment => &mut self.employment,
            Measure::LaborForce => &mut self.labor_force,
            Measure::Unemployment => &mut self.unemployment,
            Measure::UnemploymentRate => &mut self.unemployment_rate,
        };
        *slot = value;
    }

    /// True when no measure has a value.
    pub fn is_empty(&self) -> bool {
        Measure::ALL.iter().all(|&m| self.get(m).is_none())
    }

    /// Ordering key of the final table.
    pub fn sort_key(&self) -> (&str, i32, u8) {
        (&self.area_code, self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReshapeStats {
    /// Decoded records whose area code is not in the catalog.
    pub unmatched: usize,
    /// County-months dropped because none of their values were numeric.
    pub empty: usize,
    pub observations: usize,
}

/// Inner-join `records` with `catalog` and pivot measures into columns.
///
/// Groups are keyed by (area code, year, month); fips, state and county name
/// are functions of the area code. A measure seen twice in a group keeps the
/// last value in source order. Groups without a single numeric value are
/// dropped. Groups come back in first-seen order.
pub fn reshape(
    records: &[DecodedRecord],
    catalog: &AreaCatalog,
) -> (Vec<CountyObservation>, ReshapeStats) {
    let mut stats = ReshapeStats::default();
    let mut index: HashMap<(&str, i32, u8), usize> = HashMap::new();
    let mut out: Vec<CountyObservation> = Vec::new();

    for rec in records {
        let Some(area) = catalog.get(&rec.area_code) else {
            stats.unmatched += 1;
            continue;
        };

        let key = (rec.area_code.as_str(), rec.year, rec.month);
        let slot = *index.entry(key).or_insert_with(|| {
            out.push(CountyObservation {
                area_code: rec.area_code.clone(),
                fips: rec.fips.clone(),
                state: area.state.clone(),
                countyname: area.countyname.clone(),
                year: rec.year,
                month: rec.month,
                employment: None,
                labor_force: None,
                unemployment: None,
                unemployment_rate: None,
            });
            out.len() - 1
        });
        out[slot].set(rec.measure, rec.value);
    }

    let groups = out.len();
    out.retain(|obs| !obs.is_empty());
    stats.empty = groups - out.len();
    stats.observations = out.len();
    (out, stats)
}
