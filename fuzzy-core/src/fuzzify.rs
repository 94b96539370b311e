//! Fuzzification: crisp inputs to membership degrees.

use crate::index::{ModelIndex, SetSlot};
use crate::model::VariableId;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Degrees keyed by variable id, then set name.
pub type MembershipMap = BTreeMap<VariableId, BTreeMap<String, f64>>;

/// Membership degree of every set slot in a [`ModelIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct Memberships {
    degrees: Vec<f64>,
}

impl Memberships {
    /// Degree stored for `slot`; 0 for an unresolved reference.
    pub fn degree(&self, slot: Option<SetSlot>) -> f64 {
        slot.and_then(|s| self.degrees.get(s.index()).copied())
            .unwrap_or(0.0)
    }

    /// All degrees in arena order.
    pub fn as_slice(&self) -> &[f64] {
        &self.degrees
    }

    /// Expand into the public id / set-name map.
    ///
    /// Every variable appears, output variables with all-zero degrees.
    pub fn to_map(&self, index: &ModelIndex<'_>) -> MembershipMap {
        let mut map = MembershipMap::new();
        for (v, variable) in index.variables().iter().enumerate() {
            let sets = map.entry(variable.id.clone()).or_default();
            for raw in index.slots_of(v) {
                let set = index.set(index.slot_at(raw));
                sets.entry(set.name.clone()).or_insert(self.degrees[raw]);
            }
        }
        map
    }
}

/// Compute degrees for every set of every variable.
///
/// Input variables without a supplied value get degree 0 for all their sets,
/// as do all sets of output variables. A non-finite value counts as not
/// supplied.
pub fn fuzzify(index: &ModelIndex<'_>, inputs: &HashMap<String, f64>) -> Memberships {
    let mut degrees = vec![0.0; index.slot_count()];

    for (v, variable) in index.variables().iter().enumerate() {
        if !variable.is_input() {
            continue;
        }

        let Some(&x) = inputs.get(&variable.name) else {
            continue;
        };
        if !x.is_finite() {
            warn!(variable = %variable.name, value = x, "Ignoring non-finite input");
            continue;
        }

        for raw in index.slots_of(v) {
            if let Some(function) = index.function(index.slot_at(raw)) {
                degrees[raw] = function.degree(x);
            }
        }
    }

    for name in inputs.keys() {
        if index.variable_by_name(name).is_none() {
            debug!(input = %name, "Input does not match any variable");
        }
    }

    Memberships { degrees }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipFunction;
    use crate::model::Variable;
    use approx::assert_abs_diff_eq;

    fn variables() -> Vec<Variable> {
        vec![
            Variable::input("Temperature")
                .with_id("t")
                .with_set("Cold", MembershipFunction::triangular(0.0, 0.0, 40.0))
                .with_set("Hot", MembershipFunction::triangular(60.0, 100.0, 100.0)),
            Variable::input("Humidity")
                .with_id("h")
                .with_set("Dry", MembershipFunction::z_shape(20.0, 60.0)),
            Variable::output("FanSpeed")
                .with_id("f")
                .with_set("Low", MembershipFunction::triangular(0.0, 0.0, 50.0)),
        ]
    }

    fn inputs(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_fuzzify_inputs() {
        let vars = variables();
        let index = ModelIndex::new(&vars, &[]);
        let memberships = fuzzify(&index, &inputs(&[("Temperature", 30.0), ("Humidity", 10.0)]));

        let map = memberships.to_map(&index);
        assert_abs_diff_eq!(map[&VariableId::from("t")]["Cold"], 0.25);
        assert_eq!(map[&VariableId::from("t")]["Hot"], 0.0);
        assert_eq!(map[&VariableId::from("h")]["Dry"], 1.0);
    }

    #[test]
    fn test_missing_input_is_zero() {
        let vars = variables();
        let index = ModelIndex::new(&vars, &[]);
        let memberships = fuzzify(&index, &inputs(&[("Temperature", 30.0)]));
        let map = memberships.to_map(&index);
        // A z-shape is 1 left of its ramp, but with no value supplied it stays 0.
        assert_eq!(map[&VariableId::from("h")]["Dry"], 0.0);
    }

    #[test]
    fn test_outputs_are_zero() {
        let vars = variables();
        let index = ModelIndex::new(&vars, &[]);
        // Even if the caller supplies a value for an output, it is not fuzzified.
        let memberships = fuzzify(&index, &inputs(&[("FanSpeed", 0.0), ("Temperature", 10.0)]));
        let map = memberships.to_map(&index);
        assert_eq!(map[&VariableId::from("f")]["Low"], 0.0);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let vars = variables();
        let index = ModelIndex::new(&vars, &[]);
        let memberships = fuzzify(&index, &inputs(&[("Humidity", f64::NAN)]));
        assert!(memberships.as_slice().iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_unresolved_slot_degree() {
        let vars = variables();
        let index = ModelIndex::new(&vars, &[]);
        let memberships = fuzzify(&index, &inputs(&[("Temperature", 80.0)]));
        assert_eq!(memberships.degree(None), 0.0);
        let hot = index.resolve(&"t".into(), "Hot");
        assert_abs_diff_eq!(memberships.degree(hot), 0.5);
    }
}
