//! Builder for decision areas.
//!
//! Lets a model be written by names instead of ids:
//!
//! ```
//! use fuzzy_core::builder::{AreaBuilder, RuleBuilder};
//! use fuzzy_core::membership::MembershipFunction;
//!
//! let snapshot = AreaBuilder::new("Climate")
//!     .input("Temperature", 0.0, 100.0)
//!     .set("Hot", MembershipFunction::triangular(60.0, 100.0, 100.0))
//!     .output("FanSpeed", 0.0, 100.0)
//!     .set("High", MembershipFunction::triangular(50.0, 100.0, 100.0))
//!     .rule(RuleBuilder::when("Temperature", "Hot").then("FanSpeed", "High"))
//!     .build()
//!     .unwrap();
//! assert_eq!(snapshot.rules.len(), 1);
//! ```

use crate::membership::MembershipFunction;
use crate::model::{
    AreaSnapshot, ChainOp, Consequent, DecisionArea, FuzzySet, Premise, Rule, Variable, VariableId,
    VariableKind,
};
use std::collections::HashMap;
use thiserror::Error;

/// Error from building an area. Rule positions are 0-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Set {0} was declared before any variable")]
    SetBeforeVariable(String),
    #[error("Variable {0} is declared more than once")]
    DuplicateVariable(String),
    #[error("Rule {} has no premises", .rule + 1)]
    NoPremises { rule: usize },
    #[error("Rule {} has no consequents", .rule + 1)]
    NoConsequents { rule: usize },
    #[error("Rule {} refers to unknown variable {variable}", .rule + 1)]
    UnknownVariable { rule: usize, variable: String },
    #[error("Rule {} refers to unknown set {variable}.{set}", .rule + 1)]
    UnknownSet {
        rule: usize,
        variable: String,
        set: String,
    },
}

/// Builder for an [`AreaSnapshot`].
#[derive(Debug, Clone)]
pub struct AreaBuilder {
    area: DecisionArea,
    variables: Vec<Variable>,
    rules: Vec<RuleBuilder>,
    /// First `set` call made with no variable to attach to.
    orphan_set: Option<String>,
}

impl AreaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            area: DecisionArea::new(name),
            variables: Vec::new(),
            rules: Vec::new(),
            orphan_set: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.area.description = Some(description.into());
        self
    }

    /// Declare an input variable over `[min, max]`.
    pub fn input(self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.variable(name, VariableKind::Input, min, max)
    }

    /// Declare an output variable over `[min, max]`.
    pub fn output(self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.variable(name, VariableKind::Output, min, max)
    }

    fn variable(mut self, name: impl Into<String>, kind: VariableKind, min: f64, max: f64) -> Self {
        self.variables
            .push(Variable::new(name, kind).with_universe(min, max));
        self
    }

    /// Add a fuzzy set to the most recently declared variable.
    pub fn set(mut self, name: impl Into<String>, function: MembershipFunction) -> Self {
        match self.variables.last_mut() {
            Some(variable) => variable.sets.push(FuzzySet::new(name, function)),
            None => {
                self.orphan_set.get_or_insert_with(|| name.into());
            }
        }
        self
    }

    pub fn rule(mut self, rule: RuleBuilder) -> Self {
        self.rules.push(rule);
        self
    }

    /// Resolve rule names to ids and produce the snapshot.
    pub fn build(self) -> Result<AreaSnapshot, BuildError> {
        if let Some(set) = self.orphan_set {
            return Err(BuildError::SetBeforeVariable(set));
        }

        let mut by_name: HashMap<&str, &Variable> = HashMap::new();
        for variable in &self.variables {
            if by_name.insert(variable.name.as_str(), variable).is_some() {
                return Err(BuildError::DuplicateVariable(variable.name.clone()));
            }
        }

        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| rule.resolve(i, &by_name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AreaSnapshot::new(self.area, self.variables, rules))
    }
}

/// Builder for one rule, written by variable and set names.
///
/// `when(a).and(b).or(c)` folds as `(a AND b) OR c`.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    premises: Vec<(String, String, ChainOp)>,
    consequents: Vec<(String, String)>,
    weight: f64,
}

impl RuleBuilder {
    /// Start a rule with its first premise.
    pub fn when(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            premises: vec![(variable.into(), set.into(), ChainOp::End)],
            consequents: Vec::new(),
            weight: 1.0,
        }
    }

    /// A rule with no premises yet.
    pub fn empty() -> Self {
        Self {
            premises: Vec::new(),
            consequents: Vec::new(),
            weight: 1.0,
        }
    }

    pub fn and(self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.chain(ChainOp::And, variable.into(), set.into())
    }

    pub fn or(self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.chain(ChainOp::Or, variable.into(), set.into())
    }

    fn chain(mut self, op: ChainOp, variable: String, set: String) -> Self {
        if let Some(last) = self.premises.last_mut() {
            last.2 = op;
        }
        self.premises.push((variable, set, ChainOp::End));
        self
    }

    pub fn then(mut self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.consequents.push((variable.into(), set.into()));
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    fn resolve(&self, rule: usize, by_name: &HashMap<&str, &Variable>) -> Result<Rule, BuildError> {
        if self.premises.is_empty() {
            return Err(BuildError::NoPremises { rule });
        }
        if self.consequents.is_empty() {
            return Err(BuildError::NoConsequents { rule });
        }

        let lookup = |variable: &str, set: &str| -> Result<VariableId, BuildError> {
            let found = by_name
                .get(variable)
                .ok_or_else(|| BuildError::UnknownVariable {
                    rule,
                    variable: variable.to_string(),
                })?;
            if found.set(set).is_none() {
                return Err(BuildError::UnknownSet {
                    rule,
                    variable: variable.to_string(),
                    set: set.to_string(),
                });
            }
            Ok(found.id.clone())
        };

        let premises = self
            .premises
            .iter()
            .map(|(variable, set, op)| {
                lookup(variable, set).map(|id| Premise::new(id, set.as_str(), *op))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let consequents = self
            .consequents
            .iter()
            .map(|(variable, set)| lookup(variable, set).map(|id| Consequent::new(id, set.as_str())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Rule::new(premises, consequents).with_weight(self.weight))
    }
}
