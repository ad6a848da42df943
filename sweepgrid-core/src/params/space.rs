use std::collections::{BTreeMap, BTreeSet};

use crate::params::map::ParameterMap;
use crate::params::value::ParameterValue;

/// Aggregate statistics for one parameter name across a batch.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ParameterStats {
    /// Parameter name as extracted.
    pub name: String,
    /// Distinct observed values, in sort order.
    pub values: BTreeSet<ParameterValue>,
    /// Number of maps containing this parameter.
    pub frequency: usize,
}

impl ParameterStats {
    /// A parameter with a single observed value cannot discriminate between clips.
    pub fn is_valid(&self) -> bool {
        self.values.len() > 1
    }

    /// Distinct value count.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

/// Global value sets and frequencies over every [`ParameterMap`] in a batch.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ParameterSpace {
    /// First-seen order.
    params: Vec<ParameterStats>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl ParameterSpace {
    /// Accumulate value sets and occurrence counts. Pure: the same input sequence always
    /// produces an equal space.
    #[tracing::instrument(skip_all)]
    pub fn analyze<'a>(maps: impl IntoIterator<Item = &'a ParameterMap>) -> Self {
        let mut space = Self::default();
        let mut map_count = 0usize;
        for map in maps {
            map_count += 1;
            for (name, value) in map.iter() {
                let idx = match space.index.get(name) {
                    Some(&idx) => idx,
                    None => {
                        space.params.push(ParameterStats {
                            name: name.to_string(),
                            values: BTreeSet::new(),
                            frequency: 0,
                        });
                        space.index.insert(name.to_string(), space.params.len() - 1);
                        space.params.len() - 1
                    }
                };
                let stats = &mut space.params[idx];
                stats.values.insert(value.clone());
                stats.frequency += 1;
            }
        }
        tracing::debug!(
            maps = map_count,
            params = space.params.len(),
            valid = space.valid().count(),
            "analyzed parameter space"
        );
        space
    }

    /// Stats for `name`, if it was seen.
    pub fn get(&self, name: &str) -> Option<&ParameterStats> {
        self.index.get(name).map(|&idx| &self.params[idx])
    }

    /// All parameters, first-seen order.
    pub fn params(&self) -> &[ParameterStats] {
        &self.params
    }

    /// Valid axis candidates, first-seen order.
    pub fn valid(&self) -> impl Iterator<Item = &ParameterStats> {
        self.params.iter().filter(|p| p.is_valid())
    }

    /// `true` when `name` varies across the batch.
    pub fn is_valid(&self, name: &str) -> bool {
        self.get(name).is_some_and(ParameterStats::is_valid)
    }

    /// Valid parameters ranked by `(frequency, value_count)` descending. Ties keep
    /// first-seen order.
    pub fn ranked(&self) -> Vec<&ParameterStats> {
        let mut ranked: Vec<&ParameterStats> = self.valid().collect();
        ranked.sort_by(|a, b| {
            (b.frequency, b.value_count()).cmp(&(a.frequency, a.value_count()))
        });
        ranked
    }

    /// Sorted value domain of `name`; empty when unknown.
    pub fn sorted_values(&self, name: &str) -> Vec<ParameterValue> {
        self.get(name)
            .map(|p| p.values.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/space.rs"]
mod tests;
