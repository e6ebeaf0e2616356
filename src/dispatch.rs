//! Deterministic planner strategy
//!
//! Computes a plan once up front and replays it action by action. Works best in
//! deterministic worlds; the plan is not revised if the simulation diverges.

use std::collections::VecDeque;

use tracing::info;

use crate::{
    Result,
    ports::{Executive, Planner, ProblemFiles, World},
};

/// Replays a precomputed plan.
#[derive(Debug, Clone, Default)]
pub struct PlanDispatcher {
    plan: VecDeque<String>,
}

impl PlanDispatcher {
    /// Dispatch an already computed plan.
    pub fn new(plan: impl IntoIterator<Item = String>) -> Self {
        Self {
            plan: plan.into_iter().collect(),
        }
    }

    /// Ask `planner` for a plan and dispatch it.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::Error::PlanNotFound`] from the planner.
    pub fn plan(planner: &dyn Planner, problem: &ProblemFiles) -> Result<Self> {
        let plan = planner.make_plan(problem)?;
        info!(steps = plan.len(), "plan computed");
        Ok(Self::new(plan))
    }

    /// Actions not yet dispatched
    pub fn remaining(&self) -> usize {
        self.plan.len()
    }
}

impl Executive for PlanDispatcher {
    fn name(&self) -> &str {
        "Planner"
    }

    fn next_action(&mut self, _world: &dyn World) -> Result<Option<String>> {
        Ok(self.plan.pop_front().map(|action| action.to_lowercase()))
    }
}
