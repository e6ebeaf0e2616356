//! Persisted policy store: both value tables plus run metadata.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{format, table::PolicyTable};
use crate::{Result, identifiers::PolicyId, ports::PolicyRepository, td::TdAlgorithm};

/// Strategies competing for the best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Deterministic planner replaying a computed plan
    Planner,
    /// Q-learning table (greedy execution or learning)
    QLearning,
    /// SARSA table (greedy execution or learning)
    Sarsa,
}

impl Strategy {
    /// Name written to the policy file and shown to users
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Planner => "Planner",
            Strategy::QLearning => "Q-Learning",
            Strategy::Sarsa => "SARSA",
        }
    }

    /// The table backing this strategy, if any
    pub fn algorithm(&self) -> Option<TdAlgorithm> {
        match self {
            Strategy::Planner => None,
            Strategy::QLearning => Some(TdAlgorithm::QLearning),
            Strategy::Sarsa => Some(TdAlgorithm::Sarsa),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planner" => Ok(Strategy::Planner),
            "q-learning" | "qlearning" => Ok(Strategy::QLearning),
            "sarsa" => Ok(Strategy::Sarsa),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Run metadata stored ahead of the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Strategy that achieved `score`
    pub best: Strategy,
    /// Fewest total actions seen to reach the goal; `0` means unset
    pub score: u64,
    /// Episode counter, `-1` before the first run
    pub run: i64,
}

impl Default for PolicyMetadata {
    fn default() -> Self {
        Self {
            best: Strategy::QLearning,
            score: 0,
            run: -1,
        }
    }
}

impl PolicyMetadata {
    /// Whether a report of `total_actions` beats the recorded score
    pub fn is_improved_by(&self, total_actions: u64) -> bool {
        (self.score == 0 && total_actions != 0) || total_actions < self.score
    }
}

/// Both learned tables and the metadata for one domain/problem pair.
///
/// Loaded once per process and flushed through its [`PolicyRepository`]
/// whenever learners checkpoint, a new run starts, or a record improves.
pub struct PolicyStore {
    id: PolicyId,
    repository: Arc<dyn PolicyRepository + Send + Sync>,
    metadata: PolicyMetadata,
    q_learning: PolicyTable,
    sarsa: PolicyTable,
}

impl PolicyStore {
    /// Load the store named `id`, creating and persisting a fresh one if the
    /// repository has nothing under that name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CorruptPolicyFile`] if the persisted metadata
    /// block is malformed. The store is not reinitialized in that case.
    pub fn load(id: PolicyId, repository: Arc<dyn PolicyRepository + Send + Sync>) -> Result<Self> {
        match repository.load(&id)? {
            Some(text) => {
                let document = format::decode(&text, id.as_str())?;
                info!(
                    policy = %id,
                    best = %document.metadata.best,
                    score = document.metadata.score,
                    run = document.metadata.run,
                    q_entries = document.q_learning.len(),
                    sarsa_entries = document.sarsa.len(),
                    "loaded policy store"
                );
                Ok(Self {
                    id,
                    repository,
                    metadata: document.metadata,
                    q_learning: document.q_learning,
                    sarsa: document.sarsa,
                })
            }
            None => {
                info!(policy = %id, "creating new policy store");
                let store = Self {
                    id,
                    repository,
                    metadata: PolicyMetadata::default(),
                    q_learning: PolicyTable::new(),
                    sarsa: PolicyTable::new(),
                };
                store.flush()?;
                Ok(store)
            }
        }
    }

    /// Overwrite the persisted representation with the in-memory state.
    pub fn flush(&self) -> Result<()> {
        let text = format::encode(&self.metadata, &self.q_learning, &self.sarsa);
        self.repository.save(&self.id, &text)?;
        debug!(
            policy = %self.id,
            run = self.metadata.run,
            q_entries = self.q_learning.len(),
            sarsa_entries = self.sarsa.len(),
            "flushed policy store"
        );
        Ok(())
    }

    /// Record `total_actions` for `strategy` if it beats the current score.
    ///
    /// Flushes only when the record changes. Returns whether it changed.
    pub fn record_if_better(&mut self, strategy: Strategy, total_actions: u64) -> Result<bool> {
        if !self.metadata.is_improved_by(total_actions) {
            debug!(
                strategy = %strategy,
                total_actions,
                score = self.metadata.score,
                "no improvement over best score"
            );
            return Ok(false);
        }

        info!(
            strategy = %strategy,
            total_actions,
            previous_score = self.metadata.score,
            previous_best = %self.metadata.best,
            "new best score"
        );
        self.metadata.best = strategy;
        self.metadata.score = total_actions;
        self.flush()?;
        Ok(true)
    }

    /// Advance the run counter and persist it before the run starts.
    pub fn begin_run(&mut self) -> Result<i64> {
        self.metadata.run += 1;
        self.flush()?;
        Ok(self.metadata.run)
    }

    pub fn id(&self) -> &PolicyId {
        &self.id
    }

    pub fn metadata(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Table learned by `algorithm`
    pub fn table(&self, algorithm: TdAlgorithm) -> &PolicyTable {
        match algorithm {
            TdAlgorithm::QLearning => &self.q_learning,
            TdAlgorithm::Sarsa => &self.sarsa,
        }
    }

    /// Mutable table learned by `algorithm`
    pub fn table_mut(&mut self, algorithm: TdAlgorithm) -> &mut PolicyTable {
        match algorithm {
            TdAlgorithm::QLearning => &mut self.q_learning,
            TdAlgorithm::Sarsa => &mut self.sarsa,
        }
    }
}

impl fmt::Debug for PolicyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyStore")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("q_learning", &self.q_learning.len())
            .field("sarsa", &self.sarsa.len())
            .finish()
    }
}
