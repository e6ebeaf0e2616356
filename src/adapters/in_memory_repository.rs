//! In-memory policy repository for testing.
//!
//! Keeps policy text in a shared map instead of on disk, so tests can inspect
//! exactly what was flushed and how often.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{Result, identifiers::PolicyId, ports::PolicyRepository};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use empower::adapters::InMemoryPolicyRepository;
/// use empower::identifiers::PolicyId;
/// use empower::ports::PolicyRepository;
///
/// let repo = InMemoryPolicyRepository::new();
/// let id = PolicyId::from_names("logistics", "p02");
/// repo.save(&id, "SARSA\n8\n12\n---\n---\n")?;
///
/// assert!(repo.contains(&id));
/// assert_eq!(repo.save_count(), 1);
/// # Ok::<(), empower::Error>(())
/// ```
///
/// # Thread Safety
///
/// Clones share the same underlying storage and counters.
#[derive(Clone, Default)]
pub struct InMemoryPolicyRepository {
    storage: Arc<Mutex<HashMap<String, String>>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryPolicyRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing policy text.
    pub fn with_policy(self, id: &PolicyId, text: impl Into<String>) -> Self {
        self.storage
            .lock()
            .unwrap()
            .insert(id.as_str().to_string(), text.into());
        self
    }

    /// Number of stores currently held.
    pub fn count(&self) -> usize {
        self.storage.lock().unwrap().len()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Stored text for `id`.
    pub fn get(&self, id: &PolicyId) -> Option<String> {
        self.storage.lock().unwrap().get(id.as_str()).cloned()
    }

    pub fn contains(&self, id: &PolicyId) -> bool {
        self.storage.lock().unwrap().contains_key(id.as_str())
    }

    /// Remove all stored policies.
    pub fn clear(&self) {
        self.storage.lock().unwrap().clear();
    }
}

impl PolicyRepository for InMemoryPolicyRepository {
    fn load(&self, id: &PolicyId) -> Result<Option<String>> {
        Ok(self.get(id))
    }

    fn save(&self, id: &PolicyId, text: &str) -> Result<()> {
        self.storage
            .lock()
            .unwrap()
            .insert(id.as_str().to_string(), text.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
