//! Engine configuration.

use serde::{Deserialize, Serialize};

/// What to do with fuzzy sets whose shape is unusable or degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapePolicy {
    /// Evaluate everything. Unknown shapes and wrong parameter counts give
    /// degree 0; degenerate parameters may give non-finite degrees.
    #[default]
    Lenient,
    /// Refuse to evaluate a snapshot containing any set that fails
    /// [`crate::membership::MembershipFunction::validate`].
    Strict,
}

/// Configuration for an [`crate::InferenceEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Handling of unusable fuzzy sets.
    pub shape_policy: ShapePolicy,
}

impl EngineConfig {
    /// Create the default (lenient) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a configuration with [`ShapePolicy::Strict`].
    pub fn strict() -> Self {
        Self::new().with_shape_policy(ShapePolicy::Strict)
    }

    /// Set the shape policy.
    pub fn with_shape_policy(mut self, policy: ShapePolicy) -> Self {
        self.shape_policy = policy;
        self
    }
}
