use std::hash::Hash;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::ql::learn::q_table::QTable;
use crate::ql::prelude::{Action, QlError};

/// Epsilon-greedy action selection.
///
/// Ties between maximizing actions are broken uniformly at random - never by first index -
/// so an untrained table does not systematically prefer one action.
pub struct EpsilonGreedyPolicy {
    rng: StdRng,
}

impl EpsilonGreedyPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn choose_action<K, A>(
        &mut self,
        table: &QTable<K, A>,
        state: &K,
        epsilon: f64,
    ) -> Result<A>
    where
        K: Clone + Hash + Eq,
        A: Action,
    {
        if epsilon > 0.0 && self.rng.gen_range(0_f64..1_f64) < epsilon {
            self.random_action()
        } else {
            self.greedy_action(table, state)
        }
    }

    pub fn random_action<A: Action>(&mut self) -> Result<A> {
        let a = self.rng.gen_range(0..A::ACTION_SPACE);
        A::try_from_numeric(a)
    }

    pub fn greedy_action<K, A>(
        &mut self,
        table: &QTable<K, A>,
        state: &K,
    ) -> Result<A>
    where
        K: Clone + Hash + Eq,
        A: Action,
    {
        let best = table.best_actions(state);
        best.choose(&mut self.rng)
            .copied()
            .ok_or_else(|| QlError::from("no action to choose from").into())
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;

    use crate::environment::road_environment::DriveAction;

    use super::*;

    const TRIALS: usize = 8_000;

    fn count_choices(
        policy: &mut EpsilonGreedyPolicy,
        table: &QTable<u32, DriveAction>,
        epsilon: f64,
    ) -> Result<FxHashMap<DriveAction, usize>> {
        let mut counts = FxHashMap::default();
        for _ in 0..TRIALS {
            *counts.entry(policy.choose_action(table, &0, epsilon)?).or_insert(0) += 1;
        }
        Ok(counts)
    }

    #[test]
    fn test_greedy_tie_break_is_uniform() -> Result<()> {
        let mut policy = EpsilonGreedyPolicy::new(Some(7));
        let table = QTable::<u32, DriveAction>::new();
        let counts = count_choices(&mut policy, &table, 0.0)?;

        let expected = TRIALS / DriveAction::all().len();
        assert_eq!(counts.len(), DriveAction::all().len());
        for (action, count) in counts {
            assert!(
                count.abs_diff(expected) < expected / 10,
                "action {} was chosen {} times, expected about {}",
                action,
                count,
                expected
            );
        }
        Ok(())
    }

    #[test]
    fn test_greedy_takes_unique_best() -> Result<()> {
        let mut policy = EpsilonGreedyPolicy::new(Some(1));
        let mut table = QTable::<u32, DriveAction>::new();
        table.set(&0, DriveAction::SetLane(2), 0.3)?;
        let counts = count_choices(&mut policy, &table, 0.0)?;
        assert_eq!(counts.get(&DriveAction::SetLane(2)), Some(&TRIALS));
        Ok(())
    }

    #[test]
    fn test_greedy_tie_break_only_among_maximizing_actions() -> Result<()> {
        let mut policy = EpsilonGreedyPolicy::new(Some(3));
        let mut table = QTable::<u32, DriveAction>::new();
        table.set(&0, DriveAction::Advance, 1.0)?;
        table.set(&0, DriveAction::SetLane(0), 1.0)?;
        table.set(&0, DriveAction::SetLane(1), -1.0)?;
        table.set(&0, DriveAction::SetLane(2), -1.0)?;
        let counts = count_choices(&mut policy, &table, 0.0)?;
        assert_eq!(counts.len(), 2);
        assert!(counts[&DriveAction::Advance] > TRIALS / 3);
        assert!(counts[&DriveAction::SetLane(0)] > TRIALS / 3);
        Ok(())
    }

    #[test]
    fn test_full_exploration_ignores_values() -> Result<()> {
        let mut policy = EpsilonGreedyPolicy::new(Some(11));
        let mut table = QTable::<u32, DriveAction>::new();
        table.set(&0, DriveAction::Advance, 100.0)?;
        let counts = count_choices(&mut policy, &table, 1.0)?;
        assert_eq!(counts.len(), DriveAction::all().len());
        assert!(counts[&DriveAction::Advance] < TRIALS / 2);
        Ok(())
    }
}
