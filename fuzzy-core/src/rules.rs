//! Rule evaluation with Zadeh operators.
//!
//! A rule's premises are folded strictly left to right. The operator stored on
//! premise `i - 1` decides how premise `i` joins the running strength: `OR`
//! takes the maximum, anything else takes the minimum. There is no
//! precedence, so `A AND B OR C` is `max(min(A, B), C)`.

use crate::fuzzify::Memberships;
use crate::index::ModelIndex;
use crate::model::{ChainOp, Rule, Variable, VariableId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

impl ChainOp {
    /// Fold `next` into the running strength `acc`.
    pub fn combine(self, acc: f64, next: f64) -> f64 {
        match self {
            ChainOp::Or => acc.max(next),
            ChainOp::And | ChainOp::End => acc.min(next),
        }
    }
}

/// One consequent of one rule, with the strength its rule fired at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiringRecord {
    pub variable: VariableId,
    pub set: String,
    pub strength: f64,
}

/// Firing strength of a chain of `(degree, operator)` premises.
///
/// An empty chain has strength 0. The result is scaled by `weight` and
/// clamped to `[0, 1]`.
pub fn firing_strength<I>(premises: I, weight: f64) -> f64
where
    I: IntoIterator<Item = (f64, ChainOp)>,
{
    let mut premises = premises.into_iter();
    let Some((mut strength, mut op)) = premises.next() else {
        return 0.0;
    };

    for (degree, next_op) in premises {
        strength = op.combine(strength, degree);
        op = next_op;
    }

    (strength * weight).clamp(0.0, 1.0)
}

/// Fire every rule of the index against `memberships`.
///
/// Produces one record per (rule, consequent) pair in rule order, including
/// consequents that point at unknown variables or sets.
pub fn fire_rules(index: &ModelIndex<'_>, memberships: &Memberships) -> Vec<FiringRecord> {
    let mut fired = Vec::new();

    for (i, rule) in index.compiled_rules().iter().enumerate() {
        let strength = firing_strength(
            rule.premises
                .iter()
                .map(|p| (memberships.degree(p.slot), p.op)),
            rule.weight,
        );
        trace!(rule = i, strength, "Rule fired");

        fired.extend(rule.consequents.iter().map(|c| FiringRecord {
            variable: c.id.clone(),
            set: c.set.to_string(),
            strength,
        }));
    }

    fired
}

/// Human-readable form of a rule: `IF Temperature IS Cold AND ... THEN FanSpeed IS Low`.
///
/// Variables missing from `variables` are shown by id.
pub struct RuleDisplay<'a> {
    rule: &'a Rule,
    variables: &'a [Variable],
}

impl<'a> RuleDisplay<'a> {
    pub fn new(rule: &'a Rule, variables: &'a [Variable]) -> Self {
        Self { rule, variables }
    }

    fn name_of(&self, id: &'a VariableId) -> &'a str {
        self.variables
            .iter()
            .find(|v| &v.id == id)
            .map_or(id.as_str(), |v| v.name.as_str())
    }
}

impl fmt::Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IF")?;
        let last = self.rule.premises.len().saturating_sub(1);
        for (i, premise) in self.rule.premises.iter().enumerate() {
            write!(f, " {} IS {}", self.name_of(&premise.variable), premise.set)?;
            if i < last {
                // Only OR changes the fold; END mid-chain behaves as AND.
                let op = match premise.op {
                    ChainOp::Or => ChainOp::Or,
                    ChainOp::And | ChainOp::End => ChainOp::And,
                };
                write!(f, " {op}")?;
            }
        }

        f.write_str(" THEN")?;
        for (i, consequent) in self.rule.consequents.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND")?;
            }
            write!(f, " {} IS {}", self.name_of(&consequent.variable), consequent.set)?;
        }

        if self.rule.weight != 1.0 {
            write!(f, " (weight {})", self.rule.weight)?;
        }
        Ok(())
    }
}
