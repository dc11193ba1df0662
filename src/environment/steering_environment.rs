use std::fmt::{Display, Formatter};

use anyhow::Result;

use crate::environment::road_environment::{Obstacles, RoadConfig, RoadEnvironment, RoadSnapshot, RoadState, Transition, NUM_LANES};
use crate::environment::state_encoder::StateKey;
use crate::ql::prelude::{Action, Environment, ModelActionType, QlError, Termination};

/// Relative steering: every action moves the car one cell forward, optionally drifting one lane aside.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum SteerAction {
    Left,
    Straight,
    Right,
}

impl Display for SteerAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            SteerAction::Left => f.write_str("↖"),
            SteerAction::Straight => f.write_str("↑"),
            SteerAction::Right => f.write_str("↗"),
        }
    }
}

impl Action for SteerAction {
    const ACTION_SPACE: ModelActionType = 3;

    fn numeric(&self) -> ModelActionType {
        match self {
            SteerAction::Left => 0,
            SteerAction::Straight => 1,
            SteerAction::Right => 2,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        match value {
            0 => Ok(SteerAction::Left),
            1 => Ok(SteerAction::Straight),
            2 => Ok(SteerAction::Right),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

/// The road of [RoadEnvironment] driven with [SteerAction]s.
///
/// Steering against the outer edge of the road keeps the lane. Rewards, termination and state keys are the
/// ones of the wrapped road.
#[derive(Clone)]
pub struct SteeringRoadEnvironment {
    road: RoadEnvironment,
}

impl SteeringRoadEnvironment {
    pub fn new(config: RoadConfig) -> Result<Self> {
        Ok(Self {
            road: RoadEnvironment::new(config)?,
        })
    }

    pub fn with_obstacles(
        config: RoadConfig,
        obstacles: Obstacles,
    ) -> Result<Self> {
        Ok(Self {
            road: RoadEnvironment::with_obstacles(config, obstacles)?,
        })
    }

    pub fn regenerate_road(&mut self) -> Result<()> { self.road.regenerate_road() }

    pub fn road(&self) -> &RoadEnvironment { &self.road }

    pub fn obstacles(&self) -> &Obstacles { self.road.obstacles() }

    pub fn snapshot(&self) -> RoadSnapshot { self.road.snapshot() }

    pub fn transition(
        &self,
        state: &RoadState,
        action: SteerAction,
    ) -> Transition {
        let lane = match action {
            SteerAction::Left => state.lane.saturating_sub(1),
            SteerAction::Straight => state.lane,
            SteerAction::Right => usize::min(state.lane + 1, NUM_LANES - 1),
        };
        self.road.outcome(RoadState::new(state.position + 1, lane), true)
    }
}

impl Environment for SteeringRoadEnvironment {
    type S = RoadState;
    type A = SteerAction;
    type K = StateKey;

    fn reset(&mut self) { self.road.reset() }

    fn state(&self) -> &Self::S { self.road.state() }

    fn state_key(&self) -> Self::K { self.road.state_key() }

    fn no_action() -> Self::A { SteerAction::Straight }

    fn step(
        &mut self,
        action: Self::A,
    ) -> Result<(&Self::S, f32, bool)> {
        let t = self.transition(self.road.state(), action);
        self.road.apply(&t);
        Ok((self.road.state(), t.reward, t.done))
    }

    fn termination(&self) -> Option<Termination> { self.road.termination() }
}
