//! The inference pipeline.
//!
//! [`InferenceEngine::evaluate`] runs, in order:
//! 1. index the snapshot ([`ModelIndex`])
//! 2. fuzzify crisp inputs ([`crate::fuzzify`])
//! 3. fire rules ([`crate::rules`])
//! 4. aggregate per output set ([`crate::aggregate`])
//! 5. defuzzify per output variable ([`crate::defuzzify`])
//!
//! Each call is a pure function of its arguments. The engine holds only its
//! configuration, so one engine can serve any number of threads.

use crate::aggregate::{aggregate, SetDegrees};
use crate::config::EngineConfig;
use crate::defuzzify::defuzzify;
use crate::fuzzify::{fuzzify, MembershipMap};
use crate::index::ModelIndex;
use crate::membership::MembershipError;
use crate::model::{AreaSnapshot, Rule, Variable, VariableId};
use crate::rules::{fire_rules, FiringRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

/// Errors from evaluation. Only raised under [`crate::config::ShapePolicy::Strict`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid fuzzy set {variable}.{set}: {source}")]
    InvalidShape {
        variable: String,
        set: String,
        #[source]
        source: MembershipError,
    },
}

/// Result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Fuzzified degrees: variable id, then set name.
    pub membership: MembershipMap,
    /// One record per (rule, consequent).
    pub fired: Vec<FiringRecord>,
    /// Aggregated output degrees: variable name, then set name.
    pub aggregated: BTreeMap<String, SetDegrees>,
    /// Crisp value per output variable name.
    pub crisp_outputs: BTreeMap<String, f64>,
}

impl Evaluation {
    /// Crisp output of the named variable.
    pub fn crisp(&self, variable: &str) -> Option<f64> {
        self.crisp_outputs.get(variable).copied()
    }

    /// Fuzzified degree of `set` on the variable with `id`.
    pub fn degree(&self, id: &VariableId, set: &str) -> Option<f64> {
        self.membership.get(id).and_then(|sets| sets.get(set)).copied()
    }

    /// Aggregated degree of `set` on the named output variable.
    pub fn aggregated_degree(&self, variable: &str, set: &str) -> Option<f64> {
        self.aggregated
            .get(variable)
            .and_then(|sets| sets.get(set))
            .copied()
    }
}

/// An evaluation together with the area and inputs it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Area name.
    pub area: String,
    pub inputs: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

/// Runs the inference pipeline under an [`EngineConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceEngine {
    config: EngineConfig,
}

impl InferenceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate `rules` over `variables` for the given crisp inputs, keyed by
    /// variable name.
    pub fn evaluate(
        &self,
        variables: &[Variable],
        rules: &[Rule],
        inputs: &HashMap<String, f64>,
    ) -> Result<Evaluation, EngineError> {
        let index = ModelIndex::with_policy(variables, rules, self.config.shape_policy)?;
        Ok(run(&index, inputs))
    }

    /// Evaluate a whole area snapshot.
    pub fn evaluate_snapshot(
        &self,
        snapshot: &AreaSnapshot,
        inputs: &HashMap<String, f64>,
    ) -> Result<Evaluation, EngineError> {
        self.evaluate(&snapshot.variables, &snapshot.rules, inputs)
    }

    /// Evaluate a snapshot and package the result with its area and inputs.
    pub fn report(
        &self,
        snapshot: &AreaSnapshot,
        inputs: &HashMap<String, f64>,
    ) -> Result<EvaluationReport, EngineError> {
        let evaluation = self.evaluate_snapshot(snapshot, inputs)?;
        Ok(EvaluationReport {
            area: snapshot.area.name.clone(),
            inputs: inputs.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            evaluation,
        })
    }
}

/// Evaluate with the default, lenient configuration. Never fails.
pub fn evaluate(
    variables: &[Variable],
    rules: &[Rule],
    inputs: &HashMap<String, f64>,
) -> Evaluation {
    run(&ModelIndex::new(variables, rules), inputs)
}

fn run(index: &ModelIndex<'_>, inputs: &HashMap<String, f64>) -> Evaluation {
    let memberships = fuzzify(index, inputs);
    let fired = fire_rules(index, &memberships);
    let aggregation = aggregate(index, &fired);
    let crisp_outputs = defuzzify(index, &aggregation);

    debug!(
        variables = index.variables().len(),
        rules = index.compiled_rules().len(),
        fired = fired.len(),
        outputs = crisp_outputs.len(),
        "Evaluation complete"
    );

    Evaluation {
        membership: memberships.to_map(index),
        fired,
        aggregated: aggregation.named(index),
        crisp_outputs,
    }
}
