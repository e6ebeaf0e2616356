//! Common test utilities for the empower test suite.
//!
//! Scripted worlds, description files on disk and store helpers shared by
//! the integration tests.

#![allow(dead_code)]

use std::{fs, path::Path, sync::Arc};

use empower::{
    PolicyId, PolicyStore,
    adapters::{InMemoryPolicyRepository, ScriptedWorld},
    ports::ProblemFiles,
};

pub const DOMAIN_TEXT: &str = "\
;; corridor domain
(define (domain corridor)
  (:requirements :strips))
";

pub const PROBLEM_TEXT: &str = "\
(define (problem walk-01) (:domain corridor)
  (:objects r))
";

/// Three cells in a row; the goal holds in the last one.
///
/// `b` lists `(left)` first, so a greedy pass over an empty table never
/// reaches the goal.
pub fn corridor() -> ScriptedWorld {
    ScriptedWorld::new("a", 1)
        .transition("a", "(right)", "b")
        .transition("b", "(left)", "a")
        .transition("b", "(right)", "c")
        .goals("c", 1)
        .with_plan(["(RIGHT)", "(RIGHT)"])
        .with_step_limit(200)
}

/// Two goals on the way, with a detour that only wastes actions.
pub fn two_goal_world() -> ScriptedWorld {
    ScriptedWorld::new("start", 2)
        .transition("start", "(wander)", "detour")
        .transition("start", "(pick)", "half")
        .transition("detour", "(back)", "start")
        .transition("half", "(drop)", "start")
        .transition("half", "(place)", "done")
        .goals("half", 1)
        .goals("done", 2)
        .with_plan(["(pick)", "(place)"])
        .with_step_limit(300)
}

pub fn problem() -> ProblemFiles {
    ProblemFiles::new("domain.pddl", "problem.pddl")
}

/// Write the domain and problem descriptions into `dir`.
pub fn write_descriptions(dir: &Path) -> ProblemFiles {
    let domain = dir.join("domain.pddl");
    let problem = dir.join("problem.pddl");
    fs::write(&domain, DOMAIN_TEXT).expect("Failed to write domain file");
    fs::write(&problem, PROBLEM_TEXT).expect("Failed to write problem file");
    ProblemFiles::new(domain, problem)
}

pub fn policy_id() -> PolicyId {
    PolicyId::from_names("corridor", "walk-01")
}

pub fn open_store(repo: &InMemoryPolicyRepository) -> PolicyStore {
    PolicyStore::load(policy_id(), Arc::new(repo.clone())).expect("Failed to open store")
}
