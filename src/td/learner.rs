//! Online Q-learning and SARSA learners

use rand::{rngs::StdRng, seq::IndexedRandom};
use tracing::{debug, info};

use super::{ExplorationBias, ExplorationSchedule, LearningParams, RewardShaper, TdAlgorithm};
use crate::{
    Error, Result,
    identifiers::StateActionKey,
    policy::PolicyStore,
    ports::{Executive, World},
};

/// Temporal difference learner for one episode.
///
/// Borrows the store for the episode and updates the table of its
/// [`TdAlgorithm`] in place. Episode memory (previous key, step count, reward
/// shaper, exploration bias) lives only as long as the learner.
///
/// The first call only chooses an action. Every later call updates the value
/// of the previous (state, action) pair before returning the next action.
/// Once all goals hold, the terminal reward is added to the last pair, the
/// store is flushed and `None` is returned.
pub struct TdLearner<'a> {
    algorithm: TdAlgorithm,
    store: &'a mut PolicyStore,
    rng: &'a mut StdRng,
    params: LearningParams,
    bias: ExplorationBias,
    shaper: RewardShaper,
    previous_key: Option<StateActionKey>,
    steps: u64,
}

impl<'a> TdLearner<'a> {
    /// Start an episode with the bias scheduled for the store's current run.
    pub fn new(
        algorithm: TdAlgorithm,
        store: &'a mut PolicyStore,
        rng: &'a mut StdRng,
        params: LearningParams,
    ) -> Self {
        let run = store.metadata().run;
        let bias = ExplorationSchedule.bias_for_run(run, &mut *rng);
        debug!(
            algorithm = ?algorithm,
            run,
            explore = bias.explore,
            exploit = bias.exploit,
            "exploration bias drawn"
        );
        Self {
            algorithm,
            store,
            rng,
            params,
            bias,
            shaper: RewardShaper::new(),
            previous_key: None,
            steps: 0,
        }
    }

    /// Q-learning learner over the store's Q-learning table
    pub fn q_learning(
        store: &'a mut PolicyStore,
        rng: &'a mut StdRng,
        params: LearningParams,
    ) -> Self {
        Self::new(TdAlgorithm::QLearning, store, rng, params)
    }

    /// SARSA learner over the store's SARSA table
    pub fn sarsa(store: &'a mut PolicyStore, rng: &'a mut StdRng, params: LearningParams) -> Self {
        Self::new(TdAlgorithm::Sarsa, store, rng, params)
    }

    /// Replace the scheduled bias for this episode.
    pub fn with_bias(mut self, bias: ExplorationBias) -> Self {
        self.bias = bias;
        self
    }

    pub fn algorithm(&self) -> TdAlgorithm {
        self.algorithm
    }

    pub fn bias(&self) -> ExplorationBias {
        self.bias
    }

    /// Actions chosen so far this episode
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn finish(&mut self, world: &dyn World) -> Result<()> {
        if let Some(key) = self.previous_key.take() {
            let reward = self.shaper.reward(world, 0);
            self.store.table_mut(self.algorithm).add(key, reward);
        }
        self.store.flush()?;
        info!(
            algorithm = ?self.algorithm,
            steps = self.steps,
            goals = self.shaper.goals_reached(),
            "episode reached all goals"
        );
        Ok(())
    }

    /// Update the previous pair toward `target`. No-op on the first step.
    fn update_previous(
        &mut self,
        world: &dyn World,
        legal_actions: usize,
        target: f64,
    ) -> Result<()> {
        let Some(key) = self.previous_key.clone() else {
            return Ok(());
        };

        let reward = self.shaper.reward(world, legal_actions);
        let table = self.store.table_mut(self.algorithm);
        let current = table.get(&key);
        let updated = self.params.updated_value(current, reward, target);
        table.set(key, updated);

        if self.steps.is_multiple_of(self.params.flush_interval) {
            self.store.flush()?;
        }
        Ok(())
    }

    fn random_action(&mut self, state: &str, legal: &[String]) -> Result<String> {
        legal
            .choose(&mut *self.rng)
            .cloned()
            .ok_or_else(|| Error::NoLegalActions {
                state: state.to_string(),
            })
    }

    /// Greedy action and its value in `state`
    fn greedy(&self, state: &str, legal: &[String]) -> Result<(String, f64)> {
        self.store
            .table(self.algorithm)
            .greedy_action(state, legal)
            .map(|(action, value)| (action.to_string(), value))
            .ok_or_else(|| Error::NoLegalActions {
                state: state.to_string(),
            })
    }

    /// Off-policy step: update toward the greedy maximum, then choose.
    fn q_learning_step(
        &mut self,
        world: &dyn World,
        state: &str,
        legal: &[String],
    ) -> Result<String> {
        let (greedy, max_value) = self.greedy(state, legal)?;
        self.update_previous(world, legal.len(), max_value)?;

        if self.bias.should_exploit(&mut *self.rng) {
            Ok(greedy)
        } else {
            self.random_action(state, legal)
        }
    }

    /// On-policy step: choose, then update toward the chosen action's value.
    fn sarsa_step(
        &mut self,
        world: &dyn World,
        state: &str,
        legal: &[String],
    ) -> Result<String> {
        let (chosen, value) = if self.bias.should_exploit(&mut *self.rng) {
            self.greedy(state, legal)?
        } else {
            let action = self.random_action(state, legal)?;
            let value = self.store.table(self.algorithm).value_of(state, &action);
            (action, value)
        };
        self.update_previous(world, legal.len(), value)?;
        Ok(chosen)
    }
}

impl Executive for TdLearner<'_> {
    fn name(&self) -> &str {
        self.algorithm.strategy().name()
    }

    fn next_action(&mut self, world: &dyn World) -> Result<Option<String>> {
        if world.all_goals_satisfied() {
            self.finish(world)?;
            return Ok(None);
        }

        let legal = world.legal_actions()?;
        let state = world.state();
        if legal.is_empty() {
            return Err(Error::NoLegalActions { state });
        }

        let chosen = match self.algorithm {
            TdAlgorithm::QLearning => self.q_learning_step(world, &state, &legal)?,
            TdAlgorithm::Sarsa => self.sarsa_step(world, &state, &legal)?,
        };

        self.shaper
            .remember_state(self.previous_key.as_ref().map(StateActionKey::state));
        self.previous_key = Some(StateActionKey::new(state, chosen.clone()));
        self.steps += 1;
        Ok(Some(chosen))
    }
}
