//! Experiment controller scenarios over scripted worlds.

mod common;

use empower::{
    Error, Phase, PolicyStore, Strategy, TdAlgorithm,
    adapters::{InMemoryPolicyRepository, ScriptedWorld},
    pipeline::{ExperimentController, ScheduledEpisode},
    ports::EpisodeReport,
};

fn controller(world: &ScriptedWorld, store: PolicyStore, seed: u64) -> ExperimentController {
    ExperimentController::new(
        store,
        common::problem(),
        Box::new(world.clone()),
        Box::new(world.clone()),
    )
    .with_seed(seed)
}

#[test]
fn test_learning_runs_follow_schedule() {
    let world = common::two_goal_world();
    let repo = InMemoryPolicyRepository::new();
    let mut controller = controller(&world, common::open_store(&repo), 3);

    let outcomes = controller.learn_many(12, |_| {}).unwrap();
    for (expected_run, outcome) in outcomes.iter().enumerate() {
        let run = expected_run as i64;
        assert_eq!(outcome.run, run);
        assert_eq!(outcome.phase, Phase::Learning);
        assert_eq!(outcome.strategy, ScheduledEpisode::for_run(run).strategy());
        let report = outcome.report.expect("every run produces a report");
        assert!(report.success, "run {run} did not reach the goal");
    }
    assert_eq!(controller.store().metadata().run, 11);
    assert_eq!(world.episodes(), 12);
    assert_eq!(world.plans_requested(), 1);
}

#[test]
fn test_planner_baseline_is_hard_to_beat() {
    let world = common::two_goal_world();
    let repo = InMemoryPolicyRepository::new();
    let mut controller = controller(&world, common::open_store(&repo), 8);

    let outcomes = controller.learn_many(20, |_| {}).unwrap();
    assert!(outcomes[0].recorded);
    // The plan is the shortest path; no learner run can improve on it.
    assert!(outcomes[1..].iter().all(|outcome| !outcome.recorded));

    let metadata = controller.store().metadata();
    assert_eq!(metadata.best, Strategy::Planner);
    assert_eq!(metadata.score, 2);
}

#[test]
fn test_learner_records_when_no_baseline_exists() {
    let world = ScriptedWorld::new("start", 1)
        .transition("start", "(go)", "goal")
        .goals("goal", 1);
    let repo = InMemoryPolicyRepository::new();
    let mut controller = controller(&world, common::open_store(&repo), 21);

    let baseline = controller.learn().unwrap();
    assert_eq!(baseline.strategy, Strategy::Planner);
    assert!(baseline.report.is_none());

    let first_learner = controller.learn().unwrap();
    assert_eq!(first_learner.strategy, Strategy::QLearning);
    assert_eq!(
        first_learner.report,
        Some(EpisodeReport {
            total_actions: 1,
            success: true
        })
    );
    assert!(first_learner.recorded);
    assert_eq!(controller.store().metadata().best, Strategy::QLearning);
    assert_eq!(controller.store().metadata().score, 1);
}

#[test]
fn test_evaluation_passes_after_run_400() {
    let world = common::corridor();
    let id = common::policy_id();
    let repo = InMemoryPolicyRepository::new().with_policy(
        &id,
        "SARSA\n5\n419\n---\na (right) 1\nb (right) 5\n---\na (right) 2\nb (right) 4\n",
    );
    let store = common::open_store(&repo);
    let q_before = store.table(TdAlgorithm::QLearning).clone();
    let mut controller = controller(&world, store, 4);

    let q_pass = controller.learn().unwrap();
    assert_eq!(q_pass.run, 420);
    assert_eq!(q_pass.strategy, Strategy::QLearning);
    assert_eq!(
        q_pass.report,
        Some(EpisodeReport {
            total_actions: 2,
            success: true
        })
    );
    assert!(q_pass.recorded);
    // Greedy passes never change the table they follow.
    assert_eq!(controller.store().table(TdAlgorithm::QLearning), &q_before);

    let sarsa_pass = controller.learn().unwrap();
    assert_eq!(sarsa_pass.run, 421);
    assert_eq!(sarsa_pass.strategy, Strategy::Sarsa);
    assert!(!sarsa_pass.recorded);
    assert_eq!(controller.store().metadata().best, Strategy::QLearning);
    assert_eq!(controller.store().metadata().score, 2);
    assert_eq!(world.plans_requested(), 0);
}

#[test]
fn test_cut_off_episode_is_not_recorded() {
    let world = common::corridor();
    let id = common::policy_id();
    // An empty Q-learning table sends the greedy pass back and forth.
    let repo = InMemoryPolicyRepository::new().with_policy(&id, "Planner\n0\n439\n---\n---\n");
    let mut controller = controller(&world, common::open_store(&repo), 4);

    let outcome = controller.learn().unwrap();
    assert_eq!(outcome.run, 440);
    let report = outcome.report.unwrap();
    assert!(!report.success);
    assert_eq!(report.total_actions, 200);
    assert!(!outcome.recorded);
    assert_eq!(controller.store().metadata().score, 0);
}

#[test]
fn test_cut_off_learning_episode_persists_values() {
    let world = ScriptedWorld::new("a", 1)
        .transition("a", "(go)", "b")
        .transition("b", "(back)", "a")
        .goals("unreachable", 1)
        .with_step_limit(5);
    let repo = InMemoryPolicyRepository::new();
    let mut controller = controller(&world, common::open_store(&repo), 13);

    let baseline = controller.learn().unwrap();
    assert!(baseline.report.is_none());

    let outcome = controller.learn().unwrap();
    assert_eq!(outcome.strategy, Strategy::QLearning);
    let report = outcome.report.unwrap();
    assert!(!report.success);
    assert_eq!(report.total_actions, 5);

    let learned = controller.store().table(TdAlgorithm::QLearning).clone();
    assert!(!learned.is_empty());
    let reloaded = common::open_store(&repo);
    assert_eq!(reloaded.table(TdAlgorithm::QLearning), &learned);
}

#[test]
fn test_execution_uses_recorded_table() {
    let world = common::corridor();
    let id = common::policy_id();
    let repo = InMemoryPolicyRepository::new()
        .with_policy(&id, "sarsa\n2\n30\n---\n---\na (right) 2\nb (right) 4\n");
    let mut controller = controller(&world, common::open_store(&repo), 9);
    let saves = repo.save_count();

    let outcome = controller.run(Phase::Execution).unwrap();
    assert_eq!(outcome.phase, Phase::Execution);
    assert_eq!(outcome.strategy, Strategy::Sarsa);
    assert_eq!(outcome.run, 30);
    assert_eq!(
        outcome.report,
        Some(EpisodeReport {
            total_actions: 2,
            success: true
        })
    );
    assert_eq!(repo.save_count(), saves);
    assert_eq!(controller.store().metadata().run, 30);
    assert_eq!(world.plans_requested(), 0);
}

#[test]
fn test_execution_with_planner_best_replans() {
    let world = common::corridor();
    let repo = InMemoryPolicyRepository::new();
    let mut controller = controller(&world, common::open_store(&repo), 2);
    controller.learn().unwrap();

    let outcome = controller.execute().unwrap();
    assert_eq!(outcome.strategy, Strategy::Planner);
    assert_eq!(outcome.report.unwrap().total_actions, 2);
    assert_eq!(world.plans_requested(), 2);
}

#[test]
fn test_corrupt_store_fails_before_any_episode() {
    let id = common::policy_id();
    let repo = InMemoryPolicyRepository::new().with_policy(&id, "Greedy\n1\n2\n---\n---\n");
    let result = PolicyStore::load(id, std::sync::Arc::new(repo));
    assert!(matches!(result, Err(Error::CorruptPolicyFile { .. })));
}
