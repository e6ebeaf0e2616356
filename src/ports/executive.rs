//! Executive port - the action-choosing side of an episode
//!
//! A simulator drives an episode by repeatedly asking an [`Executive`] for the
//! next action, handing it a [`World`] view of the current simulated state.
//! The episode ends when the executive answers `None`.

use crate::Result;

/// Read-only view of the simulated world at the current step.
///
/// Implemented by simulator adapters; the state representation itself stays
/// behind this boundary.
pub trait World {
    /// Labels of the actions legal in the current state, in the simulator's
    /// enumeration order.
    fn legal_actions(&self) -> Result<Vec<String>>;

    /// Stable serialization of the current state.
    fn state(&self) -> String;

    /// Whether every goal of the problem currently holds.
    fn all_goals_satisfied(&self) -> bool;

    /// Number of goals that currently hold.
    fn satisfied_goal_count(&self) -> usize;
}

/// Strategy that chooses actions during one episode.
///
/// Implementations:
/// - [`crate::dispatch::PlanDispatcher`] replays a computed plan
/// - [`crate::td::TdLearner`] learns online (Q-learning or SARSA)
/// - [`crate::td::GreedyExecutor`] follows a learned table without changing it
///
/// # Examples
///
/// ```
/// use empower::ports::{Executive, World};
///
/// struct FirstLegal;
///
/// impl Executive for FirstLegal {
///     fn name(&self) -> &str {
///         "first-legal"
///     }
///
///     fn next_action(&mut self, world: &dyn World) -> empower::Result<Option<String>> {
///         if world.all_goals_satisfied() {
///             return Ok(None);
///         }
///         Ok(world.legal_actions()?.into_iter().next())
///     }
/// }
/// ```
pub trait Executive {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Choose the next action, or `None` to end the episode.
    fn next_action(&mut self, world: &dyn World) -> Result<Option<String>>;
}
