//! Repository port for policy store persistence.

use crate::{Result, identifiers::PolicyId};

/// Storage for the text of persisted policy stores.
///
/// Adapters decide where the text lives (files, memory); the format itself is
/// owned by [`crate::policy::format`].
///
/// # Examples
///
/// ```
/// use empower::adapters::InMemoryPolicyRepository;
/// use empower::identifiers::PolicyId;
/// use empower::ports::PolicyRepository;
///
/// let repo = InMemoryPolicyRepository::new();
/// let id = PolicyId::from_names("blocks", "p01");
/// assert!(repo.load(&id)?.is_none());
///
/// repo.save(&id, "Q-Learning\n0\n-1\n---\n---\n")?;
/// assert!(repo.load(&id)?.is_some());
/// # Ok::<(), empower::Error>(())
/// ```
pub trait PolicyRepository {
    /// Persisted text for `id`, or `None` if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage exists but cannot be read.
    fn load(&self, id: &PolicyId) -> Result<Option<String>>;

    /// Replace whatever is stored under `id` with `text`.
    ///
    /// Implementations must not leave a partially written store behind when
    /// they fail.
    fn save(&self, id: &PolicyId, text: &str) -> Result<()>;
}
