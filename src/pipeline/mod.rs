//! Episode orchestration
//!
//! [`ExperimentController`] picks the strategy for each run, drives the
//! simulator and keeps the best-score record of the policy store current.

pub mod controller;

pub use controller::{ExperimentController, Phase, RunOutcome, ScheduledEpisode};
