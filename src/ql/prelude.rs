use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

use anyhow::Result;
use console_engine::screen::Screen;

/// Data type we use to encode an `Action` as a table column.
pub type ModelActionType = u8;

pub trait Action: Display + Debug + Sized + Clone + Copy + Hash + PartialEq + Eq {
    /// Number of possible actions
    const ACTION_SPACE: ModelActionType;
    /// Identifying the Action as a unique value in range (0..Self::ACTION_SPACE)
    fn numeric(&self) -> ModelActionType;
    /// Fails for values outside of `0..Self::ACTION_SPACE`
    fn try_from_numeric(value: ModelActionType) -> Result<Self>;

    fn is_valid(&self) -> bool { self.numeric() < Self::ACTION_SPACE }

    /// All actions in numeric order
    fn all() -> Vec<Self> {
        (0..Self::ACTION_SPACE).filter_map(|v| Self::try_from_numeric(v).ok()).collect()
    }
}

/// Learning environment, modeling the world of a learning agent
pub trait Environment {
    /// Raw state of the agent inside the world
    type S: Clone + Debug;
    type A: Action;
    /// Discrete, hashable representation of the current state, used as table key
    type K: Clone + Debug + Hash + Eq + Ord;

    /// Resets the environment to its starting point (the world itself stays as it is)
    fn reset(&mut self);

    /// Current state
    fn state(&self) -> &Self::S;

    /// Table key of the current state
    fn state_key(&self) -> Self::K;

    /// The Action-variant which is taken, when nothing has been learned yet
    fn no_action() -> Self::A;

    /// Performs one time/action-step.
    ///
    /// Applies the given `action` to the environment and returns:
    ///   - next state
    ///   - immediate reward earned during performing that step
    ///   - done flag (e.g. car crashed or reached the goal)
    ///
    fn step(
        &mut self,
        action: Self::A,
    ) -> Result<(&Self::S, f32, bool)>;

    /// How the last step ended (if it ended the episode at all)
    fn termination(&self) -> Option<Termination>;
}

/// Reason for an environment to report `done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    GoalReached,
    Crashed,
    OutOfBounds,
}

impl Display for Termination {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Termination::GoalReached => f.write_str("goal reached"),
            Termination::Crashed => f.write_str("crashed"),
            Termination::OutOfBounds => f.write_str("out of bounds"),
        }
    }
}

pub trait DebugVisualizer {
    fn one_line_info(&self) -> String;
    fn render_to_console(&self) -> Screen;
}

#[derive(Debug)]
pub struct QlError(pub String);

impl QlError {
    pub fn from(msg: &str) -> Self { QlError(msg.to_string()) }
}

impl Display for QlError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for QlError {}
