//! Testing utilities for fuzzy models.
//!
//! This module provides:
//! - Ready-made areas (`fan_controller`, `tipping`) for integration tests and demos
//! - Helpers for building input maps and checking crisp outputs

use crate::builder::{AreaBuilder, RuleBuilder};
use crate::engine::Evaluation;
use crate::membership::MembershipFunction;
use crate::model::AreaSnapshot;
use std::collections::HashMap;

/// Default tolerance for [`assert_crisp`].
pub const CRISP_TOLERANCE: f64 = 1e-6;

/// One input, one output, two rules.
///
/// - Temperature `[0, 100]`: Cold `tri[0, 0, 40]`, Hot `tri[60, 100, 100]`
/// - FanSpeed `[0, 100]`: Low `tri[0, 0, 50]`, High `tri[50, 100, 100]`
/// - Cold -> Low, Hot -> High
pub fn fan_controller() -> AreaSnapshot {
    build(
        AreaBuilder::new("Fan controller")
            .description("Fan speed from room temperature")
            .input("Temperature", 0.0, 100.0)
            .set("Cold", MembershipFunction::triangular(0.0, 0.0, 40.0))
            .set("Hot", MembershipFunction::triangular(60.0, 100.0, 100.0))
            .output("FanSpeed", 0.0, 100.0)
            .set("Low", MembershipFunction::triangular(0.0, 0.0, 50.0))
            .set("High", MembershipFunction::triangular(50.0, 100.0, 100.0))
            .rule(RuleBuilder::when("Temperature", "Cold").then("FanSpeed", "Low"))
            .rule(RuleBuilder::when("Temperature", "Hot").then("FanSpeed", "High")),
    )
}

/// The classic restaurant tipping problem, with OR rules.
pub fn tipping() -> AreaSnapshot {
    build(
        AreaBuilder::new("Tipping")
            .description("Tip percentage from service and food quality")
            .input("Service", 0.0, 10.0)
            .set("Poor", MembershipFunction::gaussian(0.0, 1.5))
            .set("Good", MembershipFunction::gaussian(5.0, 1.5))
            .set("Excellent", MembershipFunction::gaussian(10.0, 1.5))
            .input("Food", 0.0, 10.0)
            .set("Rancid", MembershipFunction::trapezoidal(0.0, 0.0, 1.0, 3.0))
            .set("Delicious", MembershipFunction::trapezoidal(7.0, 9.0, 10.0, 10.0))
            .output("Tip", 0.0, 30.0)
            .set("Cheap", MembershipFunction::triangular(0.0, 5.0, 10.0))
            .set("Average", MembershipFunction::triangular(10.0, 15.0, 20.0))
            .set("Generous", MembershipFunction::triangular(20.0, 25.0, 30.0))
            .rule(
                RuleBuilder::when("Service", "Poor")
                    .or("Food", "Rancid")
                    .then("Tip", "Cheap"),
            )
            .rule(RuleBuilder::when("Service", "Good").then("Tip", "Average"))
            .rule(
                RuleBuilder::when("Service", "Excellent")
                    .or("Food", "Delicious")
                    .then("Tip", "Generous"),
            ),
    )
}

fn build(builder: AreaBuilder) -> AreaSnapshot {
    match builder.build() {
        Ok(snapshot) => snapshot,
        Err(e) => panic!("fixture area is invalid: {e}"),
    }
}

/// Build an input map from `(name, value)` pairs.
pub fn inputs(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

/// Assert that `variable` defuzzified to `expected` within [`CRISP_TOLERANCE`].
#[track_caller]
pub fn assert_crisp(evaluation: &Evaluation, variable: &str, expected: f64) {
    let Some(actual) = evaluation.crisp(variable) else {
        panic!(
            "no crisp output for {variable}; outputs are {:?}",
            evaluation.crisp_outputs
        );
    };
    assert!(
        (actual - expected).abs() <= CRISP_TOLERANCE,
        "crisp output {variable} = {actual}, expected {expected}"
    );
}
