//! Greedy execution over a learned table

use tracing::debug;

use crate::{
    Error, Result,
    policy::PolicyTable,
    ports::{Executive, World},
};

/// Follows the highest-valued legal action of a table without learning.
///
/// Never writes to the table and never explores. Ties go to the first action
/// in the simulator's enumeration order.
#[derive(Debug, Clone, Copy)]
pub struct GreedyExecutor<'a> {
    name: &'static str,
    table: &'a PolicyTable,
}

impl<'a> GreedyExecutor<'a> {
    pub fn new(name: &'static str, table: &'a PolicyTable) -> Self {
        Self { name, table }
    }
}

impl Executive for GreedyExecutor<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn next_action(&mut self, world: &dyn World) -> Result<Option<String>> {
        if world.all_goals_satisfied() {
            return Ok(None);
        }

        let legal = world.legal_actions()?;
        let state = world.state();
        let (action, value) = self
            .table
            .greedy_action(&state, &legal)
            .ok_or_else(|| Error::NoLegalActions {
                state: state.clone(),
            })?;
        debug!(executive = self.name, action, value, "greedy action");
        Ok(Some(action.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::StateActionKey;

    struct Snapshot {
        all: bool,
    }

    impl World for Snapshot {
        fn legal_actions(&self) -> Result<Vec<String>> {
            Ok(vec!["(a)".into(), "(b)".into(), "(c)".into()])
        }

        fn state(&self) -> String {
            "s".to_string()
        }

        fn all_goals_satisfied(&self) -> bool {
            self.all
        }

        fn satisfied_goal_count(&self) -> usize {
            usize::from(self.all)
        }
    }

    #[test]
    fn test_returns_maximum_without_mutating() {
        let mut table = PolicyTable::new();
        table.set(StateActionKey::new("s", "(b)"), 4.0);
        table.set(StateActionKey::new("s", "(c)"), 4.0);
        let before = table.clone();

        let mut executor = GreedyExecutor::new("Q-Learning", &table);
        for _ in 0..5 {
            let action = executor.next_action(&Snapshot { all: false }).unwrap();
            assert_eq!(action.as_deref(), Some("(b)"));
        }
        assert_eq!(table, before);
    }

    #[test]
    fn test_unseen_state_takes_first_action() {
        let table = PolicyTable::new();
        let mut executor = GreedyExecutor::new("SARSA", &table);
        let action = executor.next_action(&Snapshot { all: false }).unwrap();
        assert_eq!(action.as_deref(), Some("(a)"));
    }

    #[test]
    fn test_stops_when_goals_hold() {
        let table = PolicyTable::new();
        let mut executor = GreedyExecutor::new("SARSA", &table);
        assert_eq!(executor.next_action(&Snapshot { all: true }).unwrap(), None);
        assert_eq!(executor.name(), "SARSA");
    }
}
