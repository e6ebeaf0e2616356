//! Command-line interface
//!
//! `empower <-L|-E> <domain> <problem>` runs one learning run or one
//! execution episode against the policy store of the given problem.

pub mod commands;
pub mod output;
