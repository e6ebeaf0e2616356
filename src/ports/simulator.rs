//! Simulator and planner ports.
//!
//! Both are owned by the external planning/simulation system: parsing the
//! domain, evaluating action effects and computing plans all happen behind
//! these traits.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Executive;
use crate::Result;

/// Domain and problem description files of one planning task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFiles {
    pub domain: PathBuf,
    pub problem: PathBuf,
}

impl ProblemFiles {
    pub fn new(domain: impl Into<PathBuf>, problem: impl Into<PathBuf>) -> Self {
        Self {
            domain: domain.into(),
            problem: problem.into(),
        }
    }
}

/// Result of one simulated episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// Actions applied before the episode ended
    pub total_actions: u64,
    /// Whether all goals held when it ended
    pub success: bool,
}

/// Runs one episode, asking `executive` for actions until it returns `None`
/// or the simulator's own termination condition is met.
pub trait Simulator {
    fn run(&mut self, problem: &ProblemFiles, executive: &mut dyn Executive)
    -> Result<EpisodeReport>;
}

/// Computes a plan for a problem.
pub trait Planner {
    /// Ordered action labels reaching the goal.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PlanNotFound`] when the problem is unsolvable
    /// for the planner.
    fn make_plan(&self, problem: &ProblemFiles) -> Result<Vec<String>>;
}
