//! Run command - one learning run or one execution episode

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser};
use serde::Serialize;
use serde_json::to_writer_pretty;
use tracing::warn;

use crate::{
    Error,
    adapters::ProcessSimulator,
    app::{App, ExperimentConfig},
    cli::output::{
        create_learning_progress, outcome_message, print_kv, print_outcome, print_report,
        print_section,
    },
    pipeline::{ExperimentController, Phase, RunOutcome},
    policy::PolicyMetadata,
    ports::ProblemFiles,
};

#[derive(Parser, Debug)]
#[command(name = "empower")]
#[command(
    version,
    about = "Tabular TD learning for planning problems",
    long_about = None
)]
pub struct RunArgs {
    /// Phase: -L (learning) or -E (execution)
    #[arg(allow_hyphen_values = true)]
    pub phase: String,

    /// Domain description file
    pub domain: PathBuf,

    /// Problem description file
    pub problem: PathBuf,

    /// Simulator program speaking the JSON-lines protocol
    #[arg(long)]
    pub simulator: Option<PathBuf>,

    /// Argument passed to the simulator program (repeatable)
    #[arg(long = "simulator-arg", allow_hyphen_values = true)]
    pub simulator_args: Vec<String>,

    /// Directory holding the policy files
    #[arg(long, default_value = ".")]
    pub policy_dir: PathBuf,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of learning runs (learning phase only)
    #[arg(long, short = 'n', default_value_t = 1)]
    pub episodes: usize,

    /// Write a JSON summary of the run outcomes to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Debug-level logging
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct RunSummaryFile {
    policy: String,
    phase: Phase,
    outcomes: Vec<RunOutcome>,
    metadata: PolicyMetadata,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let phase = match args.phase.parse::<Phase>() {
        Ok(phase) => phase,
        Err(err @ Error::InvalidPhase { .. }) => {
            println!("{err}");
            println!("{}", RunArgs::command().render_usage());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let mut config = ExperimentConfig::new().with_policy_dir(&args.policy_dir);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let program = args
        .simulator
        .clone()
        .ok_or_else(|| anyhow!("No simulator configured; pass --simulator <PROGRAM>"))?;
    let simulator = ProcessSimulator::new(program).with_args(args.simulator_args.iter().cloned());

    let app = App::from_config(&config);
    let problem = ProblemFiles::new(&args.domain, &args.problem);
    let id = app.policy_id(&problem).with_context(|| {
        format!(
            "Failed to derive policy name from {} and {}",
            args.domain.display(),
            args.problem.display()
        )
    })?;
    let policy = id.to_string();

    let mut controller = app
        .create_controller(
            &config,
            id,
            problem,
            Box::new(simulator.clone()),
            Box::new(simulator),
        )
        .with_context(|| format!("Failed to open policy store {policy}"))?;

    print_section("Configuration");
    print_kv("Phase", phase.flag());
    print_kv("Policy", &policy);
    print_kv("Best strategy", controller.store().metadata().best.name());
    print_kv("Best score", &controller.store().metadata().score.to_string());
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }

    let outcomes = match phase {
        Phase::Learning => learn(&mut controller, &args)?,
        Phase::Execution => {
            if args.episodes != 1 {
                warn!(
                    episodes = args.episodes,
                    "--episodes is ignored in the execution phase"
                );
            }
            vec![execution(&mut controller)?]
        }
    };

    if let Some(summary_path) = &args.summary {
        let summary = RunSummaryFile {
            policy,
            phase,
            outcomes,
            metadata: *controller.store().metadata(),
        };
        let file = File::create(summary_path)
            .with_context(|| format!("Failed to create {}", summary_path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}

fn learn(controller: &mut ExperimentController, args: &RunArgs) -> Result<Vec<RunOutcome>> {
    if args.episodes == 0 {
        return Err(anyhow!("--episodes must be at least 1"));
    }

    let progress = (args.progress && args.episodes > 1)
        .then(|| create_learning_progress(args.episodes as u64));

    let outcomes = controller
        .learn_many(args.episodes, |outcome| match &progress {
            Some(pb) => {
                pb.set_message(outcome_message(outcome));
                pb.inc(1);
            }
            None => {
                print_section("Learning run");
                print_outcome(outcome);
            }
        })
        .context("Learning run failed")?;

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    let metadata = controller.store().metadata();
    print_section("Policy record");
    print_kv("Runs", &(metadata.run + 1).to_string());
    print_kv("Best strategy", metadata.best.name());
    print_kv("Best score", &metadata.score.to_string());
    Ok(outcomes)
}

fn execution(controller: &mut ExperimentController) -> Result<RunOutcome> {
    print_section("Running execution phase");
    let outcome = controller.execute().context("Execution phase failed")?;
    if let Some(report) = &outcome.report {
        print_report(report);
    }
    println!("\nThe program used {} for the given problem", outcome.strategy);
    Ok(outcome)
}
