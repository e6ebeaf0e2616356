//! Experiment controller
//!
//! One invocation of the program is one or more sequential episodes. The
//! controller decides which strategy runs each episode, feeds the result into
//! the store's best-score record and reports what happened.

use std::{fmt, str::FromStr};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    Error, Result,
    dispatch::PlanDispatcher,
    policy::{PolicyStore, Strategy},
    ports::{EpisodeReport, Executive, Planner, ProblemFiles, Simulator},
    td::{GreedyExecutor, LearningParams, TdAlgorithm, TdLearner},
};

/// Requested phase of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// `-L`: advance the run counter and run one episode
    Learning,
    /// `-E`: follow the best recorded strategy without learning
    Execution,
}

impl Phase {
    pub fn flag(&self) -> &'static str {
        match self {
            Phase::Learning => "-L",
            Phase::Execution => "-E",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "-L" => Ok(Phase::Learning),
            "-E" => Ok(Phase::Execution),
            other => Err(Error::InvalidPhase {
                phase: other.to_string(),
            }),
        }
    }
}

/// Which episode a learning run index schedules.
///
/// | run                    | episode |
/// |------------------------|---------|
/// | 0                      | planner baseline |
/// | > 400, `run % 20 == 0` | greedy pass over the Q-learning table |
/// | > 400, `run % 20 == 1` | greedy pass over the SARSA table |
/// | odd                    | Q-learning episode |
/// | even                   | SARSA episode |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledEpisode {
    Baseline,
    Greedy(TdAlgorithm),
    Learn(TdAlgorithm),
}

impl ScheduledEpisode {
    /// Runs after which greedy evaluation passes are interleaved
    pub const EVALUATION_AFTER: i64 = 400;
    /// Spacing of the evaluation passes
    pub const EVALUATION_PERIOD: i64 = 20;

    pub fn for_run(run: i64) -> Self {
        if run == 0 {
            return ScheduledEpisode::Baseline;
        }
        if run > Self::EVALUATION_AFTER {
            match run % Self::EVALUATION_PERIOD {
                0 => return ScheduledEpisode::Greedy(TdAlgorithm::QLearning),
                1 => return ScheduledEpisode::Greedy(TdAlgorithm::Sarsa),
                _ => {}
            }
        }
        if run % 2 == 1 {
            ScheduledEpisode::Learn(TdAlgorithm::QLearning)
        } else {
            ScheduledEpisode::Learn(TdAlgorithm::Sarsa)
        }
    }

    /// Strategy credited with the episode's score
    pub fn strategy(&self) -> Strategy {
        match self {
            ScheduledEpisode::Baseline => Strategy::Planner,
            ScheduledEpisode::Greedy(algorithm) | ScheduledEpisode::Learn(algorithm) => {
                algorithm.strategy()
            }
        }
    }
}

/// What one episode of an invocation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Run counter of the episode (unchanged by execution)
    pub run: i64,
    pub phase: Phase,
    pub strategy: Strategy,
    /// `None` when the planner baseline produced no episode
    pub report: Option<EpisodeReport>,
    /// Whether the episode set a new best score
    pub recorded: bool,
}

/// Drives episodes against one policy store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use empower::adapters::{InMemoryPolicyRepository, ScriptedWorld};
/// use empower::identifiers::PolicyId;
/// use empower::pipeline::{ExperimentController, Phase};
/// use empower::policy::{PolicyStore, Strategy};
/// use empower::ports::ProblemFiles;
///
/// let world = ScriptedWorld::new("start", 1)
///     .transition("start", "(go)", "goal")
///     .goals("goal", 1)
///     .with_plan(["(go)"]);
/// let store = PolicyStore::load(
///     PolicyId::from_names("demo", "p01"),
///     Arc::new(InMemoryPolicyRepository::new()),
/// )?;
///
/// let mut controller = ExperimentController::new(
///     store,
///     ProblemFiles::new("domain.pddl", "problem.pddl"),
///     Box::new(world.clone()),
///     Box::new(world),
/// )
/// .with_seed(7);
///
/// let outcome = controller.run(Phase::Learning)?;
/// assert_eq!(outcome.run, 0);
/// assert_eq!(outcome.strategy, Strategy::Planner);
/// assert!(outcome.recorded);
/// # Ok::<(), empower::Error>(())
/// ```
pub struct ExperimentController {
    store: PolicyStore,
    problem: ProblemFiles,
    simulator: Box<dyn Simulator>,
    planner: Box<dyn Planner>,
    params: LearningParams,
    rng: StdRng,
}

impl ExperimentController {
    pub fn new(
        store: PolicyStore,
        problem: ProblemFiles,
        simulator: Box<dyn Simulator>,
        planner: Box<dyn Planner>,
    ) -> Self {
        Self {
            store,
            problem,
            simulator,
            planner,
            params: LearningParams::default(),
            rng: StdRng::seed_from_u64(rand::random::<u64>()),
        }
    }

    pub fn with_params(mut self, params: LearningParams) -> Self {
        self.params = params;
        self
    }

    /// Make exploration reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    pub fn into_store(self) -> PolicyStore {
        self.store
    }

    pub fn problem(&self) -> &ProblemFiles {
        &self.problem
    }

    /// Run the episode `phase` asks for.
    pub fn run(&mut self, phase: Phase) -> Result<RunOutcome> {
        match phase {
            Phase::Learning => self.learn(),
            Phase::Execution => self.execute(),
        }
    }

    /// One learning run.
    ///
    /// The run counter is advanced and persisted before the episode starts.
    /// A failing planner baseline is logged and yields no report.
    pub fn learn(&mut self) -> Result<RunOutcome> {
        let run = self.store.begin_run()?;
        let episode = ScheduledEpisode::for_run(run);
        let strategy = episode.strategy();
        info!(run, episode = ?episode, strategy = %strategy, "starting learning run");

        let report = match episode {
            ScheduledEpisode::Baseline => match self.plan_episode() {
                Ok(report) => Some(report),
                Err(err) => {
                    warn!(run, error = %err, "planner baseline failed");
                    None
                }
            },
            ScheduledEpisode::Greedy(algorithm) => Some(self.greedy_episode(algorithm)?),
            ScheduledEpisode::Learn(algorithm) => Some(self.learning_episode(algorithm)?),
        };

        let recorded = match report {
            Some(report) => self.record(strategy, report)?,
            None => false,
        };

        Ok(RunOutcome {
            run,
            phase: Phase::Learning,
            strategy,
            report,
            recorded,
        })
    }

    /// `count` learning runs in sequence.
    ///
    /// `on_outcome` sees every outcome as soon as its episode ends.
    pub fn learn_many(
        &mut self,
        count: usize,
        mut on_outcome: impl FnMut(&RunOutcome),
    ) -> Result<Vec<RunOutcome>> {
        let mut outcomes = Vec::with_capacity(count);
        for _ in 0..count {
            let outcome = self.learn()?;
            on_outcome(&outcome);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Follow the best recorded strategy once without learning.
    ///
    /// Nothing is written to the store. A planner best re-plans from scratch
    /// and propagates [`Error::PlanNotFound`].
    pub fn execute(&mut self) -> Result<RunOutcome> {
        let metadata = *self.store.metadata();
        info!(
            best = %metadata.best,
            score = metadata.score,
            run = metadata.run,
            "running execution phase"
        );

        let report = match metadata.best.algorithm() {
            None => self.plan_episode()?,
            Some(algorithm) => self.greedy_episode(algorithm)?,
        };

        Ok(RunOutcome {
            run: metadata.run,
            phase: Phase::Execution,
            strategy: metadata.best,
            report: Some(report),
            recorded: false,
        })
    }

    fn record(&mut self, strategy: Strategy, report: EpisodeReport) -> Result<bool> {
        if !report.success {
            info!(
                strategy = %strategy,
                total_actions = report.total_actions,
                "episode ended without reaching the goal"
            );
            return Ok(false);
        }
        self.store.record_if_better(strategy, report.total_actions)
    }

    fn plan_episode(&mut self) -> Result<EpisodeReport> {
        let mut dispatcher = PlanDispatcher::plan(self.planner.as_ref(), &self.problem)?;
        self.simulate(&mut dispatcher)
    }

    fn greedy_episode(&mut self, algorithm: TdAlgorithm) -> Result<EpisodeReport> {
        let mut executor =
            GreedyExecutor::new(algorithm.strategy().name(), self.store.table(algorithm));
        self.simulator.run(&self.problem, &mut executor)
    }

    /// Learner episode. The store is flushed however the episode ends, so
    /// values learned since the last checkpoint survive a cut-off.
    fn learning_episode(&mut self, algorithm: TdAlgorithm) -> Result<EpisodeReport> {
        let result = {
            let mut learner =
                TdLearner::new(algorithm, &mut self.store, &mut self.rng, self.params);
            self.simulator.run(&self.problem, &mut learner)
        };
        self.store.flush()?;
        result
    }

    fn simulate(&mut self, executive: &mut dyn Executive) -> Result<EpisodeReport> {
        self.simulator.run(&self.problem, executive)
    }
}

impl fmt::Debug for ExperimentController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentController")
            .field("store", &self.store)
            .field("problem", &self.problem)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        adapters::{InMemoryPolicyRepository, ScriptedWorld},
        identifiers::PolicyId,
        policy::PolicyMetadata,
    };

    fn corridor() -> ScriptedWorld {
        ScriptedWorld::new("a", 1)
            .transition("a", "(right)", "b")
            .transition("b", "(left)", "a")
            .transition("b", "(right)", "c")
            .goals("c", 1)
            .with_plan(["(right)", "(right)"])
    }

    fn controller(world: &ScriptedWorld, repo: &InMemoryPolicyRepository) -> ExperimentController {
        let store =
            PolicyStore::load(PolicyId::from_names("d", "p"), Arc::new(repo.clone())).unwrap();
        ExperimentController::new(
            store,
            ProblemFiles::new("d.pddl", "p.pddl"),
            Box::new(world.clone()),
            Box::new(world.clone()),
        )
        .with_seed(11)
    }

    #[test]
    fn test_phase_parsing() {
        assert_eq!("-L".parse::<Phase>().unwrap(), Phase::Learning);
        assert_eq!("-E".parse::<Phase>().unwrap(), Phase::Execution);
        match "-X".parse::<Phase>() {
            Err(Error::InvalidPhase { phase }) => assert_eq!(phase, "-X"),
            other => panic!("expected InvalidPhase, got {other:?}"),
        }
        assert!("-l".parse::<Phase>().is_err());
    }

    #[test]
    fn test_schedule_for_run() {
        use ScheduledEpisode::*;
        use TdAlgorithm::*;

        assert_eq!(ScheduledEpisode::for_run(0), Baseline);
        assert_eq!(ScheduledEpisode::for_run(1), Learn(QLearning));
        assert_eq!(ScheduledEpisode::for_run(2), Learn(Sarsa));
        assert_eq!(ScheduledEpisode::for_run(399), Learn(QLearning));
        assert_eq!(ScheduledEpisode::for_run(400), Learn(Sarsa));
        assert_eq!(ScheduledEpisode::for_run(401), Learn(QLearning));
        assert_eq!(ScheduledEpisode::for_run(420), Greedy(QLearning));
        assert_eq!(ScheduledEpisode::for_run(421), Greedy(Sarsa));
        assert_eq!(ScheduledEpisode::for_run(422), Learn(Sarsa));
        assert_eq!(ScheduledEpisode::for_run(440), Greedy(QLearning));
    }

    #[test]
    fn test_first_run_records_planner_baseline() {
        let world = corridor();
        let repo = InMemoryPolicyRepository::new();
        let mut controller = controller(&world, &repo);

        let outcome = controller.learn().unwrap();
        assert_eq!(outcome.run, 0);
        assert_eq!(outcome.strategy, Strategy::Planner);
        assert_eq!(
            outcome.report,
            Some(EpisodeReport {
                total_actions: 2,
                success: true
            })
        );
        assert!(outcome.recorded);
        assert_eq!(
            controller.store().metadata(),
            &PolicyMetadata {
                best: Strategy::Planner,
                score: 2,
                run: 0
            }
        );
        assert_eq!(world.plans_requested(), 1);
    }

    #[test]
    fn test_failing_baseline_is_swallowed() {
        let world = ScriptedWorld::new("a", 1)
            .transition("a", "(go)", "b")
            .goals("b", 1);
        let repo = InMemoryPolicyRepository::new();
        let mut controller = controller(&world, &repo);

        let outcome = controller.learn().unwrap();
        assert_eq!(outcome.run, 0);
        assert_eq!(outcome.report, None);
        assert!(!outcome.recorded);
        assert_eq!(controller.store().metadata().score, 0);
        // The run counter was persisted before the baseline failed.
        assert!(repo.get(controller.store().id()).unwrap().contains("\n0\n---"));
    }

    #[test]
    fn test_learning_runs_alternate_tables() {
        let world = corridor();
        let repo = InMemoryPolicyRepository::new();
        let mut controller = controller(&world, &repo);

        let outcomes = controller.learn_many(3, |_| {}).unwrap();
        let strategies: Vec<_> = outcomes.iter().map(|o| o.strategy).collect();
        assert_eq!(
            strategies,
            vec![Strategy::Planner, Strategy::QLearning, Strategy::Sarsa]
        );
        assert_eq!(controller.store().metadata().run, 2);
        assert!(!controller.store().table(TdAlgorithm::QLearning).is_empty());
        assert!(!controller.store().table(TdAlgorithm::Sarsa).is_empty());
        assert_eq!(world.episodes(), 3);
    }

    #[test]
    fn test_execute_follows_best_without_writing() {
        let world = corridor();
        let repo = InMemoryPolicyRepository::new();
        let mut controller = controller(&world, &repo);
        controller.learn().unwrap();
        let saves = repo.save_count();
        let before = *controller.store().metadata();

        let outcome = controller.execute().unwrap();
        assert_eq!(outcome.phase, Phase::Execution);
        assert_eq!(outcome.strategy, Strategy::Planner);
        assert_eq!(outcome.run, 0);
        assert!(!outcome.recorded);
        assert_eq!(repo.save_count(), saves);
        assert_eq!(controller.store().metadata(), &before);
        assert_eq!(world.plans_requested(), 2);
    }

    #[test]
    fn test_execute_planner_best_propagates_plan_not_found() {
        let world = ScriptedWorld::new("a", 1)
            .transition("a", "(go)", "b")
            .goals("b", 1);
        let id = PolicyId::from_names("d", "p");
        let repo = InMemoryPolicyRepository::new().with_policy(&id, "Planner\n1\n3\n---\n---\n");
        let mut controller = controller(&world, &repo);

        let result = controller.run(Phase::Execution);
        assert!(matches!(result, Err(Error::PlanNotFound { .. })));
    }
}
