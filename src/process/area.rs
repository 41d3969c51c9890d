// src/process/area.rs

use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

use super::raw_table::tsv_reader;
use crate::error::IngestError;
use crate::schema::{AreaType, AREA_CODE_COLUMN, AREA_TEXT_COLUMN};

/// Separator between county name and state in an `area_text` description.
const DESCRIPTION_SEPARATOR: &str = ", ";

/// Human-readable name of one geography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaEntry {
    pub area_code: String,
    pub countyname: String,
    pub state: Option<String>,
}

impl AreaEntry {
    /// Split `"Autauga County, AL"` into county and state. A description
    /// without a separator is all county name.
    pub fn from_description(area_code: &str, description: &str) -> Self {
        let (county, state) = match description.split_once(DESCRIPTION_SEPARATOR) {
            Some((county, state)) => (county, Some(state.trim())),
            None => (description, None),
        };

        Self {
            area_code: area_code.trim().to_string(),
            countyname: county.trim().to_string(),
            state: state.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }
}

/// Lookup from area code to geography names, restricted to one area type.
#[derive(Debug, Clone, Default)]
pub struct AreaCatalog {
    entries: HashMap<String, AreaEntry>,
}

impl AreaCatalog {
    /// Build from `(area_code, description)` pairs. Rows with an empty code
    /// or a code of another area type are dropped; a later duplicate code
    /// replaces an earlier one.
    pub fn from_rows<I, C, D>(rows: I, area_type: AreaType) -> Self
    where
        I: IntoIterator<Item = (C, D)>,
        C: AsRef<str>,
        D: AsRef<str>,
    {
        let entries = rows
            .into_iter()
            .filter_map(|(code, description)| {
                let code = code.as_ref().trim();
                if code.is_empty() || !area_type.matches(code) {
                    return None;
                }
                let entry = AreaEntry::from_description(code, description.as_ref());
                Some((entry.area_code.clone(), entry))
            })
            .collect();

        Self { entries }
    }

    /// Parse the tab-delimited `la.area` feed. Only the `area_code` and
    /// `area_text` columns are read; both must be present in the header.
    pub fn from_reader<R: Read>(
        reader: R,
        file_id: &str,
        area_type: AreaType,
    ) -> Result<Self, IngestError> {
        let csv_err = |source| IngestError::Csv {
            file_id: file_id.to_string(),
            source,
        };

        let mut rdr = tsv_reader(reader);
        let headers = rdr.headers().map_err(csv_err)?.clone();
        let position = |name: &str| headers.iter().position(|h| h == name);
        let (Some(code_idx), Some(text_idx)) =
            (position(AREA_CODE_COLUMN), position(AREA_TEXT_COLUMN))
        else {
            return Err(IngestError::BadHeader {
                file_id: file_id.to_string(),
                expected: vec![AREA_CODE_COLUMN.to_string(), AREA_TEXT_COLUMN.to_string()],
                found: headers.iter().map(str::to_string).collect(),
            });
        };

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(csv_err)?;
            let code = record.get(code_idx).unwrap_or_default().to_string();
            let text = record.get(text_idx).unwrap_or_default().to_string();
            rows.push((code, text));
        }

        let catalog = Self::from_rows(rows, area_type);
        debug!(entries = catalog.len(), "loaded area catalog");
        Ok(catalog)
    }

    pub fn get(&self, area_code: &str) -> Option<&AreaEntry> {
        self.entries.get(area_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_split() {
        let entry = AreaEntry::from_description(" CN0100100000000 ", " Autauga County, AL");
        assert_eq!(
            entry,
            AreaEntry {
                area_code: "CN0100100000000".into(),
                countyname: "Autauga County".into(),
                state: Some("AL".into()),
            }
        );
    }

    #[test]
    fn test_description_without_separator() {
        let entry = AreaEntry::from_description("CN1100100000000", "District of Columbia");
        assert_eq!(entry.countyname, "District of Columbia");
        assert_eq!(entry.state, None);

        // only the first separator splits
        let entry = AreaEntry::from_description("CN7200100000000", "Adjuntas Municipio, PR, x");
        assert_eq!(entry.countyname, "Adjuntas Municipio");
        assert_eq!(entry.state.as_deref(), Some("PR, x"));
    }

    #[test]
    fn test_only_county_rows_are_kept() {
        let catalog = AreaCatalog::from_rows(
            vec![
                ("ST0100000000000", "Alabama"),
                ("CN0100100000000", "Autauga County, AL"),
                ("MT0111500000000", "Anniston-Oxford, AL Metropolitan Statistical Area"),
                ("   ", "Nowhere, XX"),
            ],
            AreaType::County,
        );

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("CN0100100000000").is_some());
        assert!(catalog.get("ST0100000000000").is_none());
    }

    #[test]
    fn test_from_reader() {
        let content = "area_type_code\tarea_code\tarea_text\tdisplay_level\n\
                       A\tST0100000000000\tAlabama\t0\n\
                       F\tCN0100100000000 \tAutauga County, AL\t1\n\
                       F\tCN0100300000000\tBaldwin County, AL\t1\n";
        let catalog =
            AreaCatalog::from_reader(content.as_bytes(), "la.area", AreaType::County).unwrap();

        assert_eq!(catalog.len(), 2);
        let baldwin = catalog.get("CN0100300000000").unwrap();
        assert_eq!(baldwin.countyname, "Baldwin County");
        assert_eq!(baldwin.state.as_deref(), Some("AL"));
    }

    #[test]
    fn test_from_reader_requires_columns() {
        let content = "area_code\tname\nCN0100100000000\tAutauga County, AL\n";
        let err = AreaCatalog::from_reader(content.as_bytes(), "la.area", AreaType::County)
            .unwrap_err();
        assert!(matches!(err, IngestError::BadHeader { ref file_id, .. } if file_id == "la.area"));
    }
}
