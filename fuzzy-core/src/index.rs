//! Per-evaluation index over a snapshot.
//!
//! Variables are addressed by their position in the snapshot slice and every
//! fuzzy set gets a slot in one flat arena, variable-major. Rules are compiled
//! against the index once, so premise folding reads degrees by slot instead of
//! looking up names.
//!
//! When a variable id or set name appears more than once, the first
//! occurrence wins.

use crate::config::ShapePolicy;
use crate::engine::EngineError;
use crate::membership::MembershipFunction;
use crate::model::{ChainOp, FuzzySet, Rule, Variable, VariableId};
use std::collections::HashMap;
use std::ops::Range;
use tracing::warn;

/// Position of a fuzzy set in the index arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetSlot(usize);

impl SetSlot {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct SlotEntry<'a> {
    variable: usize,
    set: &'a FuzzySet,
    function: Option<MembershipFunction>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CompiledPremise {
    pub slot: Option<SetSlot>,
    pub op: ChainOp,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledConsequent<'a> {
    pub id: &'a VariableId,
    pub set: &'a str,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule<'a> {
    pub premises: Vec<CompiledPremise>,
    pub consequents: Vec<CompiledConsequent<'a>>,
    pub weight: f64,
}

/// Resolved view of one snapshot, valid for a single evaluation.
#[derive(Debug)]
pub struct ModelIndex<'a> {
    variables: &'a [Variable],
    by_id: HashMap<&'a str, usize>,
    by_name: HashMap<&'a str, usize>,
    offsets: Vec<usize>,
    slots: Vec<SlotEntry<'a>>,
    set_lookup: HashMap<(usize, &'a str), SetSlot>,
    rules: Vec<CompiledRule<'a>>,
}

impl<'a> ModelIndex<'a> {
    /// Build the index, tolerating anything the snapshot contains.
    ///
    /// Sets whose shape cannot be resolved and rule references that point
    /// nowhere are kept and evaluate to 0.
    pub fn new(variables: &'a [Variable], rules: &'a [Rule]) -> Self {
        let mut by_id = HashMap::with_capacity(variables.len());
        let mut by_name = HashMap::with_capacity(variables.len());
        let mut offsets = Vec::with_capacity(variables.len() + 1);
        let mut slots = Vec::new();
        let mut set_lookup = HashMap::new();

        for (v, variable) in variables.iter().enumerate() {
            by_id.entry(variable.id.as_str()).or_insert(v);
            by_name.entry(variable.name.as_str()).or_insert(v);
            offsets.push(slots.len());

            for set in &variable.sets {
                let function = match set.function() {
                    Ok(function) => Some(function),
                    Err(e) => {
                        warn!(
                            variable = %variable.name,
                            set = %set.name,
                            "Fuzzy set evaluates to 0: {e}"
                        );
                        None
                    }
                };
                set_lookup
                    .entry((v, set.name.as_str()))
                    .or_insert(SetSlot(slots.len()));
                slots.push(SlotEntry {
                    variable: v,
                    set,
                    function,
                });
            }
        }
        offsets.push(slots.len());

        let mut index = Self {
            variables,
            by_id,
            by_name,
            offsets,
            slots,
            set_lookup,
            rules: Vec::with_capacity(rules.len()),
        };
        let compiled = rules.iter().map(|rule| index.compile(rule)).collect();
        index.rules = compiled;
        index
    }

    /// Build the index under `policy`.
    ///
    /// [`ShapePolicy::Strict`] rejects any set whose shape is unknown, has
    /// the wrong number of parameters, or fails
    /// [`MembershipFunction::validate`].
    pub fn with_policy(
        variables: &'a [Variable],
        rules: &'a [Rule],
        policy: ShapePolicy,
    ) -> Result<Self, EngineError> {
        if policy == ShapePolicy::Strict {
            for variable in variables {
                for set in &variable.sets {
                    set.function()
                        .and_then(|f| f.validate())
                        .map_err(|source| EngineError::InvalidShape {
                            variable: variable.name.clone(),
                            set: set.name.clone(),
                            source,
                        })?;
                }
            }
        }
        Ok(Self::new(variables, rules))
    }

    fn compile(&self, rule: &'a Rule) -> CompiledRule<'a> {
        let premises = rule
            .premises
            .iter()
            .map(|p| {
                let slot = self.resolve(&p.variable, &p.set);
                if slot.is_none() {
                    warn!(variable = %p.variable, set = %p.set, "Premise does not resolve, degree is 0");
                }
                CompiledPremise { slot, op: p.op }
            })
            .collect();

        let consequents = rule
            .consequents
            .iter()
            .map(|c| CompiledConsequent {
                id: &c.variable,
                set: c.set.as_str(),
            })
            .collect();

        CompiledRule {
            premises,
            consequents,
            weight: rule.weight,
        }
    }

    pub fn variables(&self) -> &'a [Variable] {
        self.variables
    }

    pub fn variable(&self, index: usize) -> &'a Variable {
        &self.variables[index]
    }

    pub fn variable_by_id(&self, id: &VariableId) -> Option<usize> {
        self.by_id.get(id.as_str()).copied()
    }

    pub fn variable_by_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Arena slots belonging to the variable at `index`.
    pub fn slots_of(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index + 1]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot of `set` on the variable with `id`.
    pub fn resolve(&self, id: &VariableId, set: &str) -> Option<SetSlot> {
        self.variable_by_id(id)
            .and_then(|v| self.resolve_in(v, set))
    }

    /// Slot of `set` on the variable at `index`.
    pub fn resolve_in(&self, index: usize, set: &str) -> Option<SetSlot> {
        self.set_lookup.get(&(index, set)).copied()
    }

    pub fn set(&self, slot: SetSlot) -> &'a FuzzySet {
        self.slots[slot.0].set
    }

    pub fn slot_variable(&self, slot: SetSlot) -> usize {
        self.slots[slot.0].variable
    }

    /// Resolved membership function, `None` if the stored shape is unusable.
    pub fn function(&self, slot: SetSlot) -> Option<&MembershipFunction> {
        self.slots[slot.0].function.as_ref()
    }

    /// Centroid of the set in `slot`; 0 for unusable shapes.
    pub fn centroid(&self, slot: SetSlot) -> f64 {
        self.function(slot).map_or(0.0, |f| f.centroid())
    }

    pub(crate) fn slot_at(&self, raw: usize) -> SetSlot {
        SetSlot(raw)
    }

    pub(crate) fn compiled_rules(&self) -> &[CompiledRule<'a>] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::{MembershipError, ShapeKind};
    use crate::model::{Consequent, Premise};

    fn variables() -> Vec<Variable> {
        vec![
            Variable::input("Temperature")
                .with_id("t")
                .with_set("Cold", MembershipFunction::triangular(0.0, 0.0, 40.0))
                .with_set("Hot", MembershipFunction::triangular(60.0, 100.0, 100.0)),
            Variable::output("FanSpeed")
                .with_id("f")
                .with_set("Low", MembershipFunction::triangular(0.0, 0.0, 50.0)),
        ]
    }

    #[test]
    fn test_slots_are_variable_major() {
        let vars = variables();
        let index = ModelIndex::new(&vars, &[]);
        assert_eq!(index.slot_count(), 3);
        assert_eq!(index.slots_of(0), 0..2);
        assert_eq!(index.slots_of(1), 2..3);

        let hot = index.resolve(&"t".into(), "Hot").unwrap();
        assert_eq!(hot.index(), 1);
        assert_eq!(index.set(hot).name, "Hot");
        assert_eq!(index.slot_variable(hot), 0);
        assert_eq!(index.variable_by_name("FanSpeed"), Some(1));
    }

    #[test]
    fn test_unresolved_references() {
        let vars = variables();
        let index = ModelIndex::new(&vars, &[]);
        assert!(index.resolve(&"t".into(), "Warm").is_none());
        assert!(index.resolve(&"missing".into(), "Cold").is_none());
        assert!(index.variable_by_name("Humidity").is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut vars = variables();
        vars[0].sets.push(FuzzySet::new(
            "Cold",
            MembershipFunction::triangular(-10.0, -5.0, 0.0),
        ));
        let index = ModelIndex::new(&vars, &[]);
        let cold = index.resolve(&"t".into(), "Cold").unwrap();
        assert_eq!(cold.index(), 0);
        assert_eq!(index.slots_of(0).len(), 3);
    }

    #[test]
    fn test_compiled_rules() {
        let vars = variables();
        let rules = vec![Rule::new(
            vec![
                Premise::new("t", "Cold", ChainOp::Or),
                Premise::new("t", "Tepid", ChainOp::End),
            ],
            vec![Consequent::new("f", "Low")],
        )];
        let index = ModelIndex::new(&vars, &rules);
        let compiled = &index.compiled_rules()[0];
        assert_eq!(compiled.premises.len(), 2);
        assert!(compiled.premises[0].slot.is_some());
        assert!(compiled.premises[1].slot.is_none());
        assert_eq!(compiled.consequents[0].set, "Low");
        assert_eq!(compiled.weight, 1.0);
    }

    #[test]
    fn test_unusable_shape_has_no_function() {
        let mut vars = variables();
        vars[1]
            .sets
            .push(FuzzySet::raw("High", ShapeKind::Gaussian, vec![1.0]));
        let index = ModelIndex::new(&vars, &[]);
        let high = index.resolve(&"f".into(), "High").unwrap();
        assert!(index.function(high).is_none());
        assert_eq!(index.centroid(high), 0.0);
    }

    #[test]
    fn test_strict_policy_rejects_bad_shapes() {
        let mut vars = variables();
        assert!(ModelIndex::with_policy(&vars, &[], ShapePolicy::Strict).is_ok());

        vars[1].sets.push(FuzzySet::new(
            "Flat",
            MembershipFunction::gaussian(50.0, 0.0),
        ));
        let err = ModelIndex::with_policy(&vars, &[], ShapePolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidShape {
                ref variable,
                ref set,
                source: MembershipError::Degenerate { .. },
            } if variable == "FanSpeed" && set == "Flat"
        ));

        assert!(ModelIndex::with_policy(&vars, &[], ShapePolicy::Lenient).is_ok());
    }
}
