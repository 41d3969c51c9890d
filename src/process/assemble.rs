// src/process/assemble.rs

use super::reshape::CountyObservation;

/// The final ordered table handed to the exporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub observations: Vec<CountyObservation>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CountyObservation> {
        self.observations.iter()
    }
}

/// Concatenate per-chunk observations in the order given and sort by
/// (area code, year, month). The sort is stable, so equal keys keep chunk
/// order. Chunks are expected to cover disjoint year ranges; rows from
/// overlapping chunks are all kept.
pub fn assemble<I>(chunks: I) -> Dataset
where
    I: IntoIterator<Item = Vec<CountyObservation>>,
{
    let mut observations: Vec<CountyObservation> = chunks.into_iter().flatten().collect();
    observations.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    Dataset { observations }
}
