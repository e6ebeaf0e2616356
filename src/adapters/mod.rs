//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits defined in the ports module.
//! Adapters depend on the ports, never the other way around.

pub mod file_repository;
pub mod in_memory_repository;
pub mod process_simulator;
pub mod scripted_world;

pub use file_repository::FilePolicyRepository;
pub use in_memory_repository::InMemoryPolicyRepository;
pub use process_simulator::ProcessSimulator;
pub use scripted_world::ScriptedWorld;
