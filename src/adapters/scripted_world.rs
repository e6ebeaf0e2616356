//! Deterministic in-process simulator.
//!
//! A small transition system built in code. Useful for tests and for trying
//! the learners without an external planning system.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    ports::{EpisodeReport, Executive, Planner, ProblemFiles, Simulator, World},
};

#[derive(Debug, Clone, Default)]
struct ScriptedState {
    goals: usize,
    /// Ordered `(action, successor)` pairs
    transitions: Vec<(String, String)>,
}

/// Scripted transition system implementing [`Simulator`] and [`Planner`].
///
/// # Examples
///
/// ```
/// use empower::adapters::ScriptedWorld;
/// use empower::dispatch::PlanDispatcher;
/// use empower::ports::{ProblemFiles, Simulator};
///
/// let mut world = ScriptedWorld::new("start", 1)
///     .transition("start", "(go)", "goal")
///     .goals("goal", 1);
///
/// let problem = ProblemFiles::new("domain.pddl", "problem.pddl");
/// let mut dispatcher = PlanDispatcher::new(vec!["(go)".to_string()]);
/// let report = world.run(&problem, &mut dispatcher)?;
///
/// assert_eq!(report.total_actions, 1);
/// assert!(report.success);
/// # Ok::<(), empower::Error>(())
/// ```
///
/// Clones share their episode and plan counters.
#[derive(Debug, Clone)]
pub struct ScriptedWorld {
    initial: String,
    total_goals: usize,
    states: BTreeMap<String, ScriptedState>,
    plan: Option<Vec<String>>,
    step_limit: u64,
    episodes: Arc<AtomicUsize>,
    plans: Arc<AtomicUsize>,
}

impl ScriptedWorld {
    pub const DEFAULT_STEP_LIMIT: u64 = 500;

    /// World starting in `initial` with `total_goals` goals to satisfy.
    pub fn new(initial: impl Into<String>, total_goals: usize) -> Self {
        let initial = initial.into();
        let mut states = BTreeMap::new();
        states.insert(initial.clone(), ScriptedState::default());
        Self {
            initial,
            total_goals,
            states,
            plan: None,
            step_limit: Self::DEFAULT_STEP_LIMIT,
            episodes: Arc::new(AtomicUsize::new(0)),
            plans: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set how many goals hold in `state`.
    pub fn goals(mut self, state: impl Into<String>, goals: usize) -> Self {
        self.states.entry(state.into()).or_default().goals = goals;
        self
    }

    /// Add a legal `action` in `from` leading to `to`.
    ///
    /// Actions are enumerated in the order they are added.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        action: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        let to = to.into();
        self.states.entry(to.clone()).or_default();
        self.states
            .entry(from.into())
            .or_default()
            .transitions
            .push((action.into(), to));
        self
    }

    /// Plan returned by the [`Planner`] implementation.
    pub fn with_plan<I, S>(mut self, plan: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plan = Some(plan.into_iter().map(Into::into).collect());
        self
    }

    /// Actions after which an episode is cut off as unsuccessful.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = limit;
        self
    }

    /// Episodes simulated so far
    pub fn episodes(&self) -> usize {
        self.episodes.load(Ordering::SeqCst)
    }

    /// Plans requested so far
    pub fn plans_requested(&self) -> usize {
        self.plans.load(Ordering::SeqCst)
    }

    fn state(&self, name: &str) -> Option<&ScriptedState> {
        self.states.get(name)
    }

    fn goals_in(&self, name: &str) -> usize {
        self.state(name).map_or(0, |state| state.goals)
    }

    fn successor(&self, from: &str, action: &str) -> Result<&str> {
        self.state(from)
            .and_then(|state| {
                state
                    .transitions
                    .iter()
                    .find(|(label, _)| label == action)
                    .map(|(_, to)| to.as_str())
            })
            .ok_or_else(|| Error::IllegalAction {
                action: action.to_string(),
                state: from.to_string(),
            })
    }
}

/// The world as an executive sees it at one step
struct ScriptedView<'w> {
    world: &'w ScriptedWorld,
    current: &'w str,
}

impl World for ScriptedView<'_> {
    fn legal_actions(&self) -> Result<Vec<String>> {
        Ok(self
            .world
            .state(self.current)
            .map(|state| {
                state
                    .transitions
                    .iter()
                    .map(|(action, _)| action.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn state(&self) -> String {
        self.current.to_string()
    }

    fn all_goals_satisfied(&self) -> bool {
        self.world.goals_in(self.current) >= self.world.total_goals
    }

    fn satisfied_goal_count(&self) -> usize {
        self.world.goals_in(self.current)
    }
}

impl Simulator for ScriptedWorld {
    fn run(
        &mut self,
        _problem: &ProblemFiles,
        executive: &mut dyn Executive,
    ) -> Result<EpisodeReport> {
        self.episodes.fetch_add(1, Ordering::SeqCst);
        let world: &ScriptedWorld = self;
        let mut current = world.initial.as_str();
        let mut total_actions = 0u64;

        loop {
            if total_actions >= world.step_limit {
                warn!(
                    executive = executive.name(),
                    limit = world.step_limit,
                    "episode hit the step limit"
                );
                break;
            }

            let view = ScriptedView { world, current };
            let Some(action) = executive.next_action(&view)? else {
                break;
            };
            let next = world.successor(current, &action)?;
            debug!(from = current, action = %action, to = next, "transition");
            current = next;
            total_actions += 1;
        }

        Ok(EpisodeReport {
            total_actions,
            success: world.goals_in(current) >= world.total_goals,
        })
    }
}

impl Planner for ScriptedWorld {
    fn make_plan(&self, _problem: &ProblemFiles) -> Result<Vec<String>> {
        self.plans.fetch_add(1, Ordering::SeqCst);
        self.plan.clone().ok_or_else(|| Error::PlanNotFound {
            reason: "no plan scripted for this world".to_string(),
        })
    }
}
