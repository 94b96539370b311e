//! Weighted-centroid defuzzification.

use crate::aggregate::Aggregation;
use crate::index::ModelIndex;
use std::collections::BTreeMap;

/// `sum(degree * centroid) / sum(degree)`, or 0 when the degrees sum to 0.
pub fn weighted_centroid<I>(entries: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (num, den) = entries
        .into_iter()
        .fold((0.0, 0.0), |(num, den), (degree, centroid)| {
            (num + degree * centroid, den + degree)
        });

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Crisp value per aggregated variable, keyed by variable name.
///
/// Aggregated sets that the variable does not define are skipped. Variables
/// with no aggregated sets are absent; variables whose degrees sum to 0 map
/// to 0.
pub fn defuzzify(index: &ModelIndex<'_>, aggregation: &Aggregation) -> BTreeMap<String, f64> {
    aggregation
        .iter()
        .map(|(v, sets)| {
            let crisp = weighted_centroid(sets.iter().filter_map(|(name, degree)| {
                index
                    .resolve_in(v, name)
                    .map(|slot| (*degree, index.centroid(slot)))
            }));
            (index.variable(v).name.clone(), crisp)
        })
        .collect()
}
