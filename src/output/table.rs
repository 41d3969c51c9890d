// src/output/table.rs

use anyhow::{Context, Result};
use std::io::Write;

use crate::process::{CountyObservation, Dataset};
use crate::schema::{Measure, OUTPUT_COLUMNS};

fn opt_field<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_row(obs: &CountyObservation) -> Vec<String> {
    let mut row = Vec::with_capacity(OUTPUT_COLUMNS.len());
    row.push(obs.fips.clone());
    row.push(obs.state.clone().unwrap_or_default());
    row.push(obs.countyname.clone());
    row.push(obs.year.to_string());
    row.push(obs.month.to_string());
    row.extend(Measure::OUTPUT_ORDER.iter().map(|&m| opt_field(obs.get(m))));
    row
}

/// Write the dataset as comma-separated text with a header row. Missing
/// values are empty fields.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(OUTPUT_COLUMNS)
        .context("writing CSV header")?;

    for obs in dataset.iter() {
        wtr.write_record(csv_row(obs))
            .with_context(|| format!("writing row for {} {}-{:02}", obs.fips, obs.year, obs.month))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(dataset.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(fips: &str, state: Option<&str>, countyname: &str) -> CountyObservation {
        CountyObservation {
            area_code: format!("CN{}00000000", fips),
            fips: fips.to_string(),
            state: state.map(str::to_string),
            countyname: countyname.to_string(),
            year: 2015,
            month: 1,
            employment: None,
            labor_force: None,
            unemployment: Some(1000.0),
            unemployment_rate: Some(5.2),
        }
    }

    #[test]
    fn test_csv_layout() {
        let dataset = Dataset {
            observations: vec![
                obs("01001", Some("AL"), "Autauga County"),
                obs("11001", None, "District of Columbia"),
                obs("72001", Some("PR"), "Adjuntas Municipio, Barrio"),
            ],
        };
        let mut buf = Vec::new();

        let rows = write_csv(&dataset, &mut buf).unwrap();

        assert_eq!(rows, 3);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "FIPS,state,countyname,year,month,Employment,Labor_Force,Unemployment,Unemployment_Rate\n\
             01001,AL,Autauga County,2015,1,,,1000,5.2\n\
             11001,,District of Columbia,2015,1,,,1000,5.2\n\
             72001,PR,\"Adjuntas Municipio, Barrio\",2015,1,,,1000,5.2\n"
        );
    }

    #[test]
    fn test_empty_dataset_has_header_only() {
        let mut buf = Vec::new();
        assert_eq!(write_csv(&Dataset::default(), &mut buf).unwrap(), 0);
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
