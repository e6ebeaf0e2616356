//! Dependency injection container for the experiment application.
//!
//! The container owns infrastructure dependencies (policy storage, default
//! seed) and provides factory methods for policy stores and controllers.

use std::sync::Arc;

use tracing::debug;

use super::config::ExperimentConfig;
use crate::{
    Result,
    adapters::FilePolicyRepository,
    identifiers::PolicyId,
    pipeline::ExperimentController,
    policy::PolicyStore,
    ports::{Planner, PolicyRepository, ProblemFiles, Simulator},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use empower::app::{App, ExperimentConfig};
/// use empower::identifiers::PolicyId;
///
/// let config = ExperimentConfig::new().with_policy_dir("policies");
/// let app = App::from_config(&config);
/// let store = app.open_store(PolicyId::from_names("blocks", "p01"))?;
/// # Ok::<(), empower::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use empower::app::App;
/// use empower::adapters::InMemoryPolicyRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryPolicyRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for policy store persistence
    policy_repository: Arc<dyn PolicyRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `FilePolicyRepository` in the working directory
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self::from_config(&ExperimentConfig::default())
    }

    /// Production app storing policies under `config.policy_dir` and
    /// defaulting to `config.seed`.
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            policy_repository: Arc::new(FilePolicyRepository::new(&config.policy_dir)),
            default_seed: config.seed,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    ///
    /// Primarily used for testing with in-memory dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the policy repository.
    pub fn policy_repository(&self) -> Arc<dyn PolicyRepository + Send + Sync> {
        Arc::clone(&self.policy_repository)
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Derive the policy identifier from the description files.
    pub fn policy_id(&self, problem: &ProblemFiles) -> Result<PolicyId> {
        PolicyId::from_files(&problem.domain, &problem.problem)
    }

    /// Load (or create and persist) the store named `id`.
    pub fn open_store(&self, id: PolicyId) -> Result<PolicyStore> {
        PolicyStore::load(id, self.policy_repository())
    }

    /// Create a controller over the store named `id`.
    ///
    /// The seed comes from `config`, falling back to the container default.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] for out-of-range
    /// learning parameters and propagates store loading failures.
    pub fn create_controller(
        &self,
        config: &ExperimentConfig,
        id: PolicyId,
        problem: ProblemFiles,
        simulator: Box<dyn Simulator>,
        planner: Box<dyn Planner>,
    ) -> Result<ExperimentController> {
        config.validate()?;
        let store = self.open_store(id)?;
        let mut controller = ExperimentController::new(store, problem, simulator, planner)
            .with_params(config.learning);

        // Apply seed from config or use container default
        if let Some(seed) = config.seed.or(self.default_seed) {
            debug!(seed, "seeding controller");
            controller = controller.with_seed(seed);
        }
        Ok(controller)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// # Examples
///
/// ```
/// use empower::app::AppBuilder;
/// use empower::adapters::InMemoryPolicyRepository;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryPolicyRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct AppBuilder {
    policy_repository: Option<Arc<dyn PolicyRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            policy_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom policy repository.
    pub fn with_repository<R: PolicyRepository + Send + Sync + 'static>(
        mut self,
        repo: R,
    ) -> Self {
        self.policy_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all controllers created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses `FilePolicyRepository` in the
    /// working directory.
    pub fn build(self) -> App {
        App {
            policy_repository: self
                .policy_repository
                .unwrap_or_else(|| Arc::new(FilePolicyRepository::default())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
