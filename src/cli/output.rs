//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{pipeline::RunOutcome, ports::EpisodeReport};

/// Create a progress bar for learning runs
pub fn create_learning_progress(total_runs: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_runs);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} runs ({msg})")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print an episode report
pub fn print_report(report: &EpisodeReport) {
    print_kv("Total actions", &report.total_actions.to_string());
    print_kv("Goal reached", if report.success { "yes" } else { "no" });
}

/// Print one run outcome
pub fn print_outcome(outcome: &RunOutcome) {
    print_kv("Run", &outcome.run.to_string());
    print_kv("Strategy", outcome.strategy.name());
    match &outcome.report {
        Some(report) => print_report(report),
        None => print_kv("Report", "none (strategy failed)"),
    }
    if outcome.recorded {
        print_kv("New best score", "yes");
    }
}

/// Short progress bar message for an outcome
pub fn outcome_message(outcome: &RunOutcome) -> String {
    match &outcome.report {
        Some(report) => format!(
            "run {} {}: {} actions",
            outcome.run, outcome.strategy, report.total_actions
        ),
        None => format!("run {} {}: no report", outcome.run, outcome.strategy),
    }
}
