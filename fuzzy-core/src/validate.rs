//! Model integrity checks.
//!
//! The engine tolerates broken models and evaluates what it can. This module
//! reports what it would tolerate, so editors and the command line can point
//! at the problem before anyone relies on the numbers.

use crate::membership::MembershipError;
use crate::model::{AreaSnapshot, Rule, Variable, VariableId};
use std::collections::HashSet;
use std::fmt;

/// How serious an [`Issue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The model evaluates, but probably not as intended.
    Warning,
    /// Part of the model silently evaluates to 0.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Which side of a rule a reference sits on, with its 0-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Premise(usize),
    Consequent(usize),
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Premise(i) => write!(f, "premise {}", i + 1),
            Clause::Consequent(i) => write!(f, "consequent {}", i + 1),
        }
    }
}

/// A problem found in a model. Rule positions are 0-based.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    DuplicateVariableId { id: VariableId },
    DuplicateVariableName { name: String },
    DuplicateSetName { variable: String, set: String },
    UnknownShape { variable: String, set: String },
    Arity { variable: String, set: String, source: MembershipError },
    DegenerateShape { variable: String, set: String, source: MembershipError },
    InvertedUniverse { variable: String, min: f64, max: f64 },
    NoPremises { rule: usize },
    NoConsequents { rule: usize },
    UnknownVariable { rule: usize, clause: Clause, variable: VariableId },
    UnknownSet { rule: usize, clause: Clause, variable: String, set: String },
    PremiseOnOutput { rule: usize, clause: Clause, variable: String },
    ConsequentOnInput { rule: usize, clause: Clause, variable: String },
    InvalidWeight { rule: usize, weight: f64 },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::UnknownShape { .. }
            | Issue::Arity { .. }
            | Issue::UnknownVariable { .. }
            | Issue::UnknownSet { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::DuplicateVariableId { id } => {
                write!(f, "Variable id {id} is used more than once")
            }
            Issue::DuplicateVariableName { name } => {
                write!(f, "Variable name {name} is used more than once")
            }
            Issue::DuplicateSetName { variable, set } => {
                write!(f, "{variable} defines set {set} more than once")
            }
            Issue::UnknownShape { variable, set } => {
                write!(f, "{variable}.{set} has an unknown shape")
            }
            Issue::Arity { variable, set, source }
            | Issue::DegenerateShape { variable, set, source } => {
                write!(f, "{variable}.{set}: {source}")
            }
            Issue::InvertedUniverse { variable, min, max } => {
                write!(f, "{variable} has an inverted universe [{min}, {max}]")
            }
            Issue::NoPremises { rule } => write!(f, "Rule {} has no premises", rule + 1),
            Issue::NoConsequents { rule } => write!(f, "Rule {} has no consequents", rule + 1),
            Issue::UnknownVariable { rule, clause, variable } => {
                write!(f, "Rule {} {clause}: unknown variable {variable}", rule + 1)
            }
            Issue::UnknownSet { rule, clause, variable, set } => {
                write!(f, "Rule {} {clause}: {variable} has no set {set}", rule + 1)
            }
            Issue::PremiseOnOutput { rule, clause, variable } => {
                write!(f, "Rule {} {clause}: {variable} is an output variable", rule + 1)
            }
            Issue::ConsequentOnInput { rule, clause, variable } => {
                write!(f, "Rule {} {clause}: {variable} is an input variable", rule + 1)
            }
            Issue::InvalidWeight { rule, weight } => {
                write!(f, "Rule {} has invalid weight {weight}", rule + 1)
            }
        }
    }
}

/// Every problem in `variables` and `rules`, variables first, in model order.
pub fn check_area(variables: &[Variable], rules: &[Rule]) -> Vec<Issue> {
    let mut issues = Vec::new();
    check_variables(variables, &mut issues);
    for (i, rule) in rules.iter().enumerate() {
        check_rule(i, rule, variables, &mut issues);
    }
    issues
}

/// [`check_area`] over a snapshot.
pub fn check_snapshot(snapshot: &AreaSnapshot) -> Vec<Issue> {
    check_area(&snapshot.variables, &snapshot.rules)
}

pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(Issue::is_error)
}

fn check_variables(variables: &[Variable], issues: &mut Vec<Issue>) {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();

    for variable in variables {
        if !ids.insert(&variable.id) {
            issues.push(Issue::DuplicateVariableId {
                id: variable.id.clone(),
            });
        }
        if !names.insert(variable.name.as_str()) {
            issues.push(Issue::DuplicateVariableName {
                name: variable.name.clone(),
            });
        }
        if let Some(universe) = variable.universe.filter(|u| u.is_inverted()) {
            issues.push(Issue::InvertedUniverse {
                variable: variable.name.clone(),
                min: universe.min,
                max: universe.max,
            });
        }

        let mut set_names = HashSet::new();
        for set in &variable.sets {
            if !set_names.insert(set.name.as_str()) {
                issues.push(Issue::DuplicateSetName {
                    variable: variable.name.clone(),
                    set: set.name.clone(),
                });
            }

            let owner = variable.name.clone();
            let name = set.name.clone();
            match set.function() {
                Err(MembershipError::UnknownShape) => {
                    issues.push(Issue::UnknownShape {
                        variable: owner,
                        set: name,
                    });
                }
                Err(source) => issues.push(Issue::Arity {
                    variable: owner,
                    set: name,
                    source,
                }),
                Ok(function) => {
                    if let Err(source) = function.validate() {
                        issues.push(Issue::DegenerateShape {
                            variable: owner,
                            set: name,
                            source,
                        });
                    }
                }
            }
        }
    }
}

fn check_rule(i: usize, rule: &Rule, variables: &[Variable], issues: &mut Vec<Issue>) {
    if rule.premises.is_empty() {
        issues.push(Issue::NoPremises { rule: i });
    }
    if rule.consequents.is_empty() {
        issues.push(Issue::NoConsequents { rule: i });
    }
    if !rule.weight.is_finite() || rule.weight < 0.0 {
        issues.push(Issue::InvalidWeight {
            rule: i,
            weight: rule.weight,
        });
    }

    let references = rule
        .premises
        .iter()
        .enumerate()
        .map(|(p, premise)| (Clause::Premise(p), &premise.variable, &premise.set))
        .chain(
            rule.consequents
                .iter()
                .enumerate()
                .map(|(c, consequent)| (Clause::Consequent(c), &consequent.variable, &consequent.set)),
        );

    for (clause, id, set) in references {
        let Some(variable) = variables.iter().find(|v| &v.id == id) else {
            issues.push(Issue::UnknownVariable {
                rule: i,
                clause,
                variable: id.clone(),
            });
            continue;
        };

        if variable.set(set).is_none() {
            issues.push(Issue::UnknownSet {
                rule: i,
                clause,
                variable: variable.name.clone(),
                set: set.clone(),
            });
        }

        match clause {
            Clause::Premise(_) if variable.is_output() => issues.push(Issue::PremiseOnOutput {
                rule: i,
                clause,
                variable: variable.name.clone(),
            }),
            Clause::Consequent(_) if variable.is_input() => {
                issues.push(Issue::ConsequentOnInput {
                    rule: i,
                    clause,
                    variable: variable.name.clone(),
                })
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::{MembershipFunction, ShapeKind};
    use crate::model::{ChainOp, Consequent, FuzzySet, Premise};

    fn variables() -> Vec<Variable> {
        vec![
            Variable::input("Temperature")
                .with_id("t")
                .with_universe(0.0, 100.0)
                .with_set("Cold", MembershipFunction::triangular(0.0, 0.0, 40.0))
                .with_set("Hot", MembershipFunction::triangular(60.0, 100.0, 100.0)),
            Variable::output("FanSpeed")
                .with_id("f")
                .with_set("Low", MembershipFunction::triangular(0.0, 0.0, 50.0)),
        ]
    }

    fn rule(premise: (&str, &str), consequent: (&str, &str)) -> Rule {
        Rule::new(
            vec![Premise::new(premise.0, premise.1, ChainOp::End)],
            vec![Consequent::new(consequent.0, consequent.1)],
        )
    }

    #[test]
    fn test_clean_model() {
        let issues = check_area(&variables(), &[rule(("t", "Cold"), ("f", "Low"))]);
        assert!(issues.is_empty(), "{issues:?}");
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_set_problems() {
        let mut vars = variables();
        vars[0].sets.push(FuzzySet::raw("Cold", ShapeKind::Triangular, vec![1.0, 2.0, 3.0]));
        vars[0].sets.push(FuzzySet::raw("Odd", ShapeKind::Unknown, vec![]));
        vars[0].sets.push(FuzzySet::raw("Short", ShapeKind::Gaussian, vec![1.0]));
        vars[0].sets.push(FuzzySet::raw("Flat", ShapeKind::Sigmoid, vec![0.0, 5.0]));

        let issues = check_area(&vars, &[]);
        assert_eq!(issues.len(), 4);
        assert!(matches!(&issues[0], Issue::DuplicateSetName { set, .. } if set == "Cold"));
        assert!(matches!(&issues[1], Issue::UnknownShape { set, .. } if set == "Odd"));
        assert!(matches!(
            &issues[2],
            Issue::Arity { source: MembershipError::Arity { expected: 2, found: 1, .. }, .. }
        ));
        assert!(matches!(&issues[3], Issue::DegenerateShape { set, .. } if set == "Flat"));

        assert_eq!(issues[0].severity(), Severity::Warning);
        assert_eq!(issues[1].severity(), Severity::Error);
        assert_eq!(issues[2].severity(), Severity::Error);
        assert_eq!(issues[3].severity(), Severity::Warning);
    }

    #[test]
    fn test_variable_problems() {
        let mut vars = variables();
        vars.push(Variable::input("Temperature").with_id("t").with_universe(10.0, 0.0));

        let issues = check_area(&vars, &[]);
        assert_eq!(
            issues,
            vec![
                Issue::DuplicateVariableId { id: "t".into() },
                Issue::DuplicateVariableName {
                    name: "Temperature".to_string()
                },
                Issue::InvertedUniverse {
                    variable: "Temperature".to_string(),
                    min: 10.0,
                    max: 0.0
                },
            ]
        );
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_broken_references() {
        let vars = variables();
        let rules = vec![
            rule(("missing", "Cold"), ("f", "Turbo")),
            rule(("f", "Low"), ("t", "Hot")),
        ];

        let issues = check_area(&vars, &rules);
        assert_eq!(
            issues,
            vec![
                Issue::UnknownVariable {
                    rule: 0,
                    clause: Clause::Premise(0),
                    variable: "missing".into()
                },
                Issue::UnknownSet {
                    rule: 0,
                    clause: Clause::Consequent(0),
                    variable: "FanSpeed".to_string(),
                    set: "Turbo".to_string()
                },
                Issue::PremiseOnOutput {
                    rule: 1,
                    clause: Clause::Premise(0),
                    variable: "FanSpeed".to_string()
                },
                Issue::ConsequentOnInput {
                    rule: 1,
                    clause: Clause::Consequent(0),
                    variable: "Temperature".to_string()
                },
            ]
        );
        assert!(has_errors(&issues));
    }

    #[test]
    fn test_rule_shape_problems() {
        let rules = vec![
            Rule::new(vec![], vec![]),
            rule(("t", "Hot"), ("f", "Low")).with_weight(-0.5),
            rule(("t", "Hot"), ("f", "Low")).with_weight(f64::INFINITY),
        ];
        let issues = check_area(&variables(), &rules);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0], Issue::NoPremises { rule: 0 });
        assert_eq!(issues[1], Issue::NoConsequents { rule: 0 });
        assert!(matches!(issues[2], Issue::InvalidWeight { rule: 1, .. }));
        assert!(matches!(issues[3], Issue::InvalidWeight { rule: 2, .. }));
    }

    #[test]
    fn test_display() {
        let issue = Issue::UnknownSet {
            rule: 2,
            clause: Clause::Premise(1),
            variable: "Temperature".to_string(),
            set: "Warm".to_string(),
        };
        assert_eq!(issue.to_string(), "Rule 3 premise 2: Temperature has no set Warm");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
