//! Ports (trait boundaries) for external dependencies.
//!
//! The planning/simulation system and the policy storage live outside the
//! learning core; these traits are the seams adapters plug into.

pub mod executive;
pub mod repository;
pub mod simulator;

pub use executive::{Executive, World};
pub use repository::PolicyRepository;
pub use simulator::{EpisodeReport, Planner, ProblemFiles, Simulator};
