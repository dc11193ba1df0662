use std::hash::Hash;
use std::marker::PhantomData;

use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ql::prelude::{Action, ModelActionType, QlError};

/// Sparse action-value table.
///
/// Maps `(state key, action)` to the current estimate of the expected cumulative reward.
/// Entries are created lazily on write - a pair which has never been written reads as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable<K, A>
where
    K: Clone + Hash + Eq,
    A: Action,
{
    values: FxHashMap<(K, ModelActionType), f32>,
    _phantom: PhantomData<A>,
}

impl<K, A> QTable<K, A>
where
    K: Clone + Hash + Eq,
    A: Action,
{
    pub fn new() -> Self {
        Self {
            values: FxHashMap::default(),
            _phantom: PhantomData,
        }
    }

    pub fn get(
        &self,
        state: &K,
        action: A,
    ) -> f32 {
        // the tuple key needs an owned K for the lookup
        self.values.get(&(state.clone(), action.numeric())).copied().unwrap_or(0.0)
    }

    /// Fails for an action outside of the action space
    pub fn set(
        &mut self,
        state: &K,
        action: A,
        value: f32,
    ) -> Result<()> {
        if !action.is_valid() {
            return Err(QlError(format!("action {:?} is outside of the action space", action)).into());
        }
        self.values.insert((state.clone(), action.numeric()), value);
        Ok(())
    }

    /// Values of all actions for `state`, in numeric action order
    pub fn action_values(
        &self,
        state: &K,
    ) -> Vec<(A, f32)> {
        A::all().into_iter().map(|a| (a, self.get(state, a))).collect()
    }

    pub fn max_value(
        &self,
        state: &K,
    ) -> f32 {
        self.action_values(state).into_iter().map(|(_, v)| v).fold(f32::NEG_INFINITY, f32::max)
    }

    /// All actions sharing the maximum value for `state`
    pub fn best_actions(
        &self,
        state: &K,
    ) -> Vec<A> {
        let values = self.action_values(state);
        let max = values.iter().map(|&(_, v)| v).fold(f32::NEG_INFINITY, f32::max);
        values.into_iter().filter(|&(_, v)| v == max).map(|(a, _)| a).collect()
    }

    /// Whether any action value has been written for `state`
    pub fn knows(
        &self,
        state: &K,
    ) -> bool {
        A::all().into_iter().any(|a| self.values.contains_key(&(state.clone(), a.numeric())))
    }

    /// One-step Q-learning update:
    /// `Q(s,a) <- Q(s,a) + alpha * (target - Q(s,a))`
    /// with `target = reward` for terminal steps and `reward + gamma * max_a' Q(s',a')` otherwise.
    ///
    /// Returns the new value.
    /// Fails for an action outside of the action space.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        state: &K,
        action: A,
        reward: f32,
        next_state: &K,
        done: bool,
        alpha: f32,
        gamma: f32,
    ) -> Result<f32> {
        let old = self.get(state, action);
        let target = if done { reward } else { reward + gamma * self.max_value(next_state) };
        let new = old + alpha * (target - old);
        self.set(state, action, new)?;
        Ok(new)
    }

    /// Number of stored `(state, action)` entries
    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Number of distinct states with at least one stored entry
    pub fn state_count(&self) -> usize {
        self.values.keys().map(|(k, _)| k).collect::<FxHashSet<_>>().len()
    }

    pub fn clear(&mut self) { self.values.clear() }
}

impl<K, A> Default for QTable<K, A>
where
    K: Clone + Hash + Eq,
    A: Action,
{
    fn default() -> Self { Self::new() }
}
