//! Strategy selection and tabular temporal difference learning for agents
//! acting in simulated planning environments
//!
//! This crate provides:
//! - Q-learning and SARSA learners that update a persisted value table online
//! - Greedy execution over a learned table and replay of computed plans
//! - A run-indexed exploration schedule and goal-progress reward shaping
//! - An experiment controller that picks the strategy for each run and keeps
//!   the best score per problem
//!
//! The planning system itself (domain parsing, action effects, plan search)
//! stays outside the crate behind the traits in [`ports`].

pub mod adapters;
pub mod app;
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod identifiers;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod td;

pub use error::{Error, Result};
pub use identifiers::{PolicyId, StateActionKey};
pub use pipeline::{ExperimentController, Phase, RunOutcome};
pub use policy::{PolicyMetadata, PolicyStore, PolicyTable, Strategy};
pub use td::{LearningParams, TdAlgorithm};
