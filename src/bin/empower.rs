//! empower - strategy selection and TD learning for simulated planning problems
//!
//! ```text
//! empower -L domain.pddl problem.pddl --simulator ./sim   # one learning run
//! empower -E domain.pddl problem.pddl --simulator ./sim   # follow the best strategy
//! ```

use anyhow::Result;
use clap::Parser;
use empower::cli::commands::run::{self, RunArgs};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = RunArgs::parse();
    init_tracing(args.verbose);
    run::execute(args)
}

/// Log to stderr so that reports on stdout stay clean.
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
