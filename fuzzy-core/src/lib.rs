//! Fuzzy inference engine for decision areas.
//!
//! This crate provides:
//! - Seven membership function shapes and curve sampling
//! - Fuzzification of crisp inputs
//! - Rule evaluation with left-to-right AND/OR chains (Zadeh min/max)
//! - MAX aggregation and weighted-centroid defuzzification
//! - Model validation and a name-based builder
//!
//! # Quick Start
//!
//! ```
//! use fuzzy_core::testing::{fan_controller, inputs};
//! use fuzzy_core::{EngineConfig, InferenceEngine};
//!
//! let area = fan_controller();
//! let engine = InferenceEngine::new(EngineConfig::strict());
//!
//! let result = engine
//!     .evaluate_snapshot(&area, &inputs(&[("Temperature", 80.0)]))
//!     .unwrap();
//! let speed = result.crisp("FanSpeed").unwrap();
//! assert!((speed - 250.0 / 3.0).abs() < 1e-9);
//! ```

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod defuzzify;
pub mod engine;
pub mod fuzzify;
pub mod index;
pub mod membership;
pub mod model;
pub mod rules;
pub mod testing;
pub mod validate;

// Primary public API
pub use builder::{AreaBuilder, BuildError, RuleBuilder};
pub use config::{EngineConfig, ShapePolicy};
pub use engine::{evaluate, EngineError, Evaluation, EvaluationReport, InferenceEngine};
pub use membership::{CurvePoint, MembershipError, MembershipFunction, ShapeKind};
pub use model::{
    AreaId, AreaSnapshot, ChainOp, Consequent, DecisionArea, FuzzySet, Premise, Rule, Universe,
    Variable, VariableId, VariableKind,
};
pub use rules::{FiringRecord, RuleDisplay};
pub use validate::{check_area, Issue, Severity};
