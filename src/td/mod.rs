//! Tabular temporal difference learning
//!
//! Learners run online inside a simulated episode: every call for the next
//! action first updates the value of the previous (state, action) pair, then
//! picks the next action with the episode's exploration bias.
//!
//! ## Algorithms
//!
//! - **Q-learning**: off-policy, the update target is the greedy maximum
//! - **SARSA**: on-policy, the update target is the action actually taken next
//!
//! | Aspect | Q-learning | SARSA |
//! |--------|------------|-------|
//! | Policy | Off-policy | On-policy |
//! | Target | max over legal actions | value of the chosen action |
//! | Order  | update, then choose | choose, then update |
//!
//! Both use the same update
//! `V(prev) += α · (reward + γ · (target − V(prev)))` and the same
//! [`RewardShaper`]. [`GreedyExecutor`] follows a learned table without
//! touching it.

pub mod execution;
pub mod learner;
pub mod reward;
pub mod schedule;

use serde::{Deserialize, Serialize};

pub use execution::GreedyExecutor;
pub use learner::TdLearner;
pub use reward::RewardShaper;
pub use schedule::{ExplorationBias, ExplorationSchedule};

use crate::{Error, Result, policy::Strategy};

/// Which table a learner reads and updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TdAlgorithm {
    QLearning,
    Sarsa,
}

impl TdAlgorithm {
    /// Strategy recorded when this table produces the best score
    pub fn strategy(&self) -> Strategy {
        match self {
            TdAlgorithm::QLearning => Strategy::QLearning,
            TdAlgorithm::Sarsa => Strategy::Sarsa,
        }
    }
}

/// Step size, discount and checkpoint cadence of the online update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Flush the store every this many steps
    pub flush_interval: u64,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.2,
            flush_interval: 30,
        }
    }
}

impl LearningParams {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_flush_interval(mut self, steps: u64) -> Self {
        self.flush_interval = steps;
        self
    }

    /// Check that α and γ lie in `[0, 1]` and the flush interval is positive.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::InvalidConfiguration {
                message: format!("alpha must be within [0, 1], got {}", self.alpha),
            });
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::InvalidConfiguration {
                message: format!("gamma must be within [0, 1], got {}", self.gamma),
            });
        }
        if self.flush_interval == 0 {
            return Err(Error::InvalidConfiguration {
                message: "flush interval must be at least one step".to_string(),
            });
        }
        Ok(())
    }

    /// New value of `current` after observing `reward` with update `target`.
    ///
    /// `current + α · (reward + γ · (target − current))`
    pub fn updated_value(&self, current: f64, reward: f64, target: f64) -> f64 {
        current + self.alpha * (reward + self.gamma * (target - current))
    }
}
