//! Configuration types for experiment creation.

use std::path::PathBuf;

pub use crate::td::LearningParams;
use crate::Result;

/// Configuration of one experiment invocation.
///
/// Builder-style, validated before a controller is created through the
/// dependency injection container.
///
/// # Examples
///
/// ```
/// use empower::app::{ExperimentConfig, LearningParams};
///
/// let config = ExperimentConfig::new()
///     .with_seed(42)
///     .with_policy_dir("policies")
///     .with_learning(LearningParams::default().with_flush_interval(10));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Online update parameters
    pub learning: LearningParams,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Directory holding the policy files
    pub policy_dir: PathBuf,
}

impl ExperimentConfig {
    /// Defaults: α = 0.5, γ = 0.2, flush every 30 steps, no seed, policy
    /// files in the working directory.
    pub fn new() -> Self {
        Self {
            learning: LearningParams::default(),
            seed: None,
            policy_dir: PathBuf::from("."),
        }
    }

    pub fn with_learning(mut self, learning: LearningParams) -> Self {
        self.learning = learning;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_policy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.policy_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.learning.validate()
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::new()
    }
}
