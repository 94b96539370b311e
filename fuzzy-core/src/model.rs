//! Snapshot data model: decision areas, variables, fuzzy sets and rules.
//!
//! These are plain records handed over by whatever stores the model. The
//! engine only ever reads them; references between records are by
//! [`VariableId`] and set name and are resolved per evaluation by
//! [`crate::index::ModelIndex`].

use crate::membership::{CurvePoint, MembershipError, MembershipFunction, ShapeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Define a string-backed key type.
///
/// Keys come from the storage layer (database object ids, slugs) so they are
/// opaque strings rather than UUIDs; `new()` mints a UUID string for models
/// built in memory.
macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random key.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_key!(
    /// Stable identity of a variable.
    VariableId
);

define_key!(
    /// Stable identity of a decision area.
    AreaId
);

/// Whether a variable is fed by the caller or produced by inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Input,
    Output,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Input => f.write_str("input"),
            VariableKind::Output => f.write_str("output"),
        }
    }
}

/// Display range of a variable. Never enforced numerically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub min: f64,
    pub max: f64,
}

impl Universe {
    /// Range used for charting when a variable has none.
    pub const DEFAULT: Universe = Universe {
        min: 0.0,
        max: 100.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A named fuzzy set in its stored form: a shape tag and raw parameters.
///
/// The parameter list may not match the shape (the store does not enforce
/// it); such a set simply has degree 0 everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzySet {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    #[serde(default)]
    pub params: Vec<f64>,
}

impl FuzzySet {
    /// Create a set from a typed membership function.
    pub fn new(name: impl Into<String>, function: MembershipFunction) -> Self {
        Self {
            name: name.into(),
            kind: function.kind(),
            params: function.params(),
        }
    }

    /// Create a set from its stored form without checking it.
    pub fn raw(name: impl Into<String>, kind: ShapeKind, params: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            params,
        }
    }

    /// The typed membership function, if the tag and parameters agree.
    pub fn function(&self) -> Result<MembershipFunction, MembershipError> {
        MembershipFunction::from_params(self.kind, &self.params)
    }

    /// Degree of `x`; 0 when the shape cannot be resolved.
    pub fn degree(&self, x: f64) -> f64 {
        self.function().map_or(0.0, |f| f.degree(x))
    }

    /// Representative point for defuzzification; 0 when the shape cannot be resolved.
    pub fn centroid(&self) -> f64 {
        self.function().map_or(0.0, |f| f.centroid())
    }

    /// Sample this set's curve across `universe`.
    pub fn curve(&self, universe: Universe, step: f64) -> Vec<CurvePoint> {
        crate::membership::sample_with(universe.min, universe.max, step, |x| self.degree(x))
    }
}

/// A linguistic variable ("Temperature") and its fuzzy sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(alias = "_id")]
    pub id: VariableId,
    pub name: String,
    pub kind: VariableKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe: Option<Universe>,
    #[serde(default)]
    pub sets: Vec<FuzzySet>,
}

impl Variable {
    /// Create a variable with a fresh id and no sets.
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            id: VariableId::new(),
            name: name.into(),
            kind,
            universe: None,
            sets: Vec::new(),
        }
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Input)
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Output)
    }

    pub fn with_id(mut self, id: impl Into<VariableId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_universe(mut self, min: f64, max: f64) -> Self {
        self.universe = Some(Universe::new(min, max));
        self
    }

    pub fn with_set(mut self, name: impl Into<String>, function: MembershipFunction) -> Self {
        self.sets.push(FuzzySet::new(name, function));
        self
    }

    /// First set with the given name.
    pub fn set(&self, name: &str) -> Option<&FuzzySet> {
        self.sets.iter().find(|s| s.name == name)
    }

    pub fn is_input(&self) -> bool {
        self.kind == VariableKind::Input
    }

    pub fn is_output(&self) -> bool {
        self.kind == VariableKind::Output
    }

    /// The universe, or [`Universe::DEFAULT`] when unset.
    pub fn universe_or_default(&self) -> Universe {
        self.universe.unwrap_or_default()
    }
}

/// How a premise's degree folds into the next premise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChainOp {
    And,
    Or,
    /// Conventional marker on the last premise.
    #[default]
    End,
}

impl fmt::Display for ChainOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainOp::And => f.write_str("AND"),
            ChainOp::Or => f.write_str("OR"),
            ChainOp::End => f.write_str("END"),
        }
    }
}

/// `<variable> IS <set>`, followed by the operator joining it to the next premise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Premise {
    #[serde(alias = "term")]
    pub variable: VariableId,
    #[serde(alias = "setName")]
    pub set: String,
    #[serde(default, alias = "opToNext")]
    pub op: ChainOp,
}

impl Premise {
    pub fn new(variable: impl Into<VariableId>, set: impl Into<String>, op: ChainOp) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
            op,
        }
    }
}

/// `THEN <variable> IS <set>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consequent {
    #[serde(alias = "term")]
    pub variable: VariableId,
    #[serde(alias = "setName")]
    pub set: String,
}

impl Consequent {
    pub fn new(variable: impl Into<VariableId>, set: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// An IF-THEN rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, alias = "if")]
    pub premises: Vec<Premise>,
    #[serde(default, alias = "then")]
    pub consequents: Vec<Consequent>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Rule {
    pub fn new(premises: Vec<Premise>, consequents: Vec<Consequent>) -> Self {
        Self {
            premises,
            consequents,
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// The scope a set of variables and rules belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionArea {
    #[serde(alias = "_id")]
    pub id: AreaId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DecisionArea {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AreaId::new(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Everything the engine needs for one area, as one read-only bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSnapshot {
    pub area: DecisionArea,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl AreaSnapshot {
    pub fn new(area: DecisionArea, variables: Vec<Variable>, rules: Vec<Rule>) -> Self {
        Self {
            area,
            variables,
            rules,
        }
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn variable(&self, id: &VariableId) -> Option<&Variable> {
        self.variables.iter().find(|v| &v.id == id)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.is_output())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
