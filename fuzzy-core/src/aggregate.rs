//! Aggregation of firing strengths per output set.

use crate::index::ModelIndex;
use crate::rules::FiringRecord;
use std::collections::BTreeMap;
use tracing::debug;

/// Set name to aggregated degree, for one variable.
pub type SetDegrees = BTreeMap<String, f64>;

/// Aggregated degrees keyed by variable position in the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    outputs: BTreeMap<usize, SetDegrees>,
}

impl Aggregation {
    pub fn get(&self, variable: usize) -> Option<&SetDegrees> {
        self.outputs.get(&variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SetDegrees)> {
        self.outputs.iter().map(|(v, sets)| (*v, sets))
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Re-key by variable name.
    pub fn named(&self, index: &ModelIndex<'_>) -> BTreeMap<String, SetDegrees> {
        self.outputs
            .iter()
            .map(|(v, sets)| (index.variable(*v).name.clone(), sets.clone()))
            .collect()
    }
}

/// Reduce firing records to the maximum strength per (variable, set).
///
/// Records for variables that are not in the index are dropped. Sets are kept
/// by name even if the variable has no such set; the defuzzifier skips them.
pub fn aggregate(index: &ModelIndex<'_>, fired: &[FiringRecord]) -> Aggregation {
    let mut outputs: BTreeMap<usize, SetDegrees> = BTreeMap::new();

    for record in fired {
        let Some(v) = index.variable_by_id(&record.variable) else {
            debug!(variable = %record.variable, "Dropping firing for unknown variable");
            continue;
        };
        let degree = outputs
            .entry(v)
            .or_default()
            .entry(record.set.clone())
            .or_insert(0.0);
        *degree = degree.max(record.strength);
    }

    Aggregation { outputs }
}
