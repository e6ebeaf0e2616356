//! Goal-progress reward shaping

use crate::ports::World;

/// Per-episode reward shaper shared by the Q-learning and SARSA learners.
///
/// Priority of the terms, highest first:
/// 1. all goals satisfied: [`Self::GOAL_REWARD`]
/// 2. state equal to the one two transitions back: [`Self::STAGNATION_PENALTY`]
/// 3. otherwise `2 × legal actions`, plus [`Self::PROGRESS_BONUS`] when the
///    satisfied-goal count rises above anything seen earlier in the episode
#[derive(Debug, Clone, Default)]
pub struct RewardShaper {
    goals_reached: usize,
    previous_state: Option<String>,
}

impl RewardShaper {
    pub const GOAL_REWARD: f64 = 300.0;
    pub const STAGNATION_PENALTY: f64 = -200.0;
    pub const PROGRESS_BONUS: f64 = 150.0;
    pub const BRANCHING_WEIGHT: f64 = 2.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Reward for the transition that led to the world's current state.
    pub fn reward(&mut self, world: &dyn World, legal_actions: usize) -> f64 {
        if world.all_goals_satisfied() {
            return Self::GOAL_REWARD;
        }

        if self
            .previous_state
            .as_deref()
            .is_some_and(|previous| previous == world.state())
        {
            return Self::STAGNATION_PENALTY;
        }

        let mut reward = Self::BRANCHING_WEIGHT * legal_actions as f64;
        if self.reached_new_goal(world.satisfied_goal_count()) {
            reward += Self::PROGRESS_BONUS;
        }
        reward
    }

    /// Remember the state the next stagnation check compares against.
    pub fn remember_state(&mut self, state: Option<&str>) {
        self.previous_state = state.map(str::to_string);
    }

    /// Highest satisfied-goal count seen this episode
    pub fn goals_reached(&self) -> usize {
        self.goals_reached
    }

    /// Forget everything observed in the previous episode
    pub fn reset(&mut self) {
        self.goals_reached = 0;
        self.previous_state = None;
    }

    fn reached_new_goal(&mut self, satisfied: usize) -> bool {
        if satisfied > self.goals_reached {
            self.goals_reached = satisfied;
            return true;
        }
        false
    }
}
