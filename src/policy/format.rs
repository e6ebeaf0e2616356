//! Line-oriented text format of a persisted policy store.
//!
//! ```text
//! <best strategy name>
//! <best score>
//! <run counter>
//! ---
//! <state-action key> <value>      (Q-Learning table)
//! ---
//! <state-action key> <value>      (SARSA table)
//! ```
//!
//! Entries whose value is not a finite number are dropped on load. A malformed
//! metadata block is a [`Error::CorruptPolicyFile`].

use std::fmt::Write as _;

use super::{
    store::{PolicyMetadata, Strategy},
    table::PolicyTable,
};
use crate::{Error, Result, identifiers::StateActionKey};

/// Separator line between the metadata block and the two tables
pub const SEPARATOR: &str = "---";

/// Decoded contents of a policy file
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    pub metadata: PolicyMetadata,
    pub q_learning: PolicyTable,
    pub sarsa: PolicyTable,
}

/// Render the metadata and both tables.
pub fn encode(metadata: &PolicyMetadata, q_learning: &PolicyTable, sarsa: &PolicyTable) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", metadata.best.name());
    let _ = writeln!(out, "{}", metadata.score);
    let _ = writeln!(out, "{}", metadata.run);
    let _ = writeln!(out, "{SEPARATOR}");
    for (key, value) in q_learning.iter() {
        let _ = writeln!(out, "{key} {value}");
    }
    let _ = writeln!(out, "{SEPARATOR}");
    for (key, value) in sarsa.iter() {
        let _ = writeln!(out, "{key} {value}");
    }
    out
}

/// Parse a policy file. `policy` names the file in error messages.
pub fn decode(text: &str, policy: &str) -> Result<PolicyDocument> {
    let corrupt = |reason: String| Error::CorruptPolicyFile {
        policy: policy.to_string(),
        reason,
    };

    let mut lines = text.lines();
    let mut header = |what: &str| {
        lines
            .next()
            .map(str::trim)
            .ok_or_else(|| corrupt(format!("missing {what} line")))
    };

    let best_line = header("best strategy")?;
    let score_line = header("score")?;
    let run_line = header("run counter")?;
    let separator = header("separator")?;

    let best: Strategy = best_line
        .parse()
        .map_err(|_| corrupt(format!("unknown strategy name '{best_line}'")))?;
    let score: u64 = score_line
        .parse()
        .map_err(|_| corrupt(format!("score '{score_line}' is not an integer")))?;
    let run: i64 = run_line
        .parse()
        .map_err(|_| corrupt(format!("run counter '{run_line}' is not an integer")))?;
    if separator != SEPARATOR {
        return Err(corrupt(format!(
            "expected '{SEPARATOR}' after the metadata block, found '{separator}'"
        )));
    }

    let mut q_learning = PolicyTable::new();
    let mut sarsa = PolicyTable::new();
    let mut in_sarsa = false;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == SEPARATOR {
            in_sarsa = true;
            continue;
        }
        let Some((key, value)) = line.rsplit_once(' ') else {
            continue;
        };
        let Some(value) = parse_value(value) else {
            continue;
        };
        let table = if in_sarsa { &mut sarsa } else { &mut q_learning };
        table.set(StateActionKey::parse(key), value);
    }

    Ok(PolicyDocument {
        metadata: PolicyMetadata { best, score, run },
        q_learning,
        sarsa,
    })
}

fn parse_value(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}
