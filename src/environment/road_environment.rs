use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::environment::state_encoder::{EncodingMode, StateEncoder, StateKey};
use crate::ql::prelude::{Action, Environment, ModelActionType, QlError, Termination};

pub const ROAD_LENGTH: usize = 15;
pub const NUM_LANES: usize = 3;
pub const GOAL: usize = 14;
pub const START_LANE: usize = 1;

#[derive(Debug, Clone)]
pub struct RoadConfig {
    /// Number of longitudinal cells; valid positions are `0..=length`
    pub length: usize,
    /// Position at which an episode counts as solved
    pub goal: usize,
    /// Probability of an interior cell to carry obstacles
    pub density: f64,
    /// A blocked cell blocks `1..=max_blocked_per_cell` distinct lanes
    pub max_blocked_per_cell: usize,
    /// First position which may carry an obstacle (keeps a clear run-up behind the start)
    pub first_obstacle_position: usize,
    pub start_lane: usize,
    /// Reward of every non-terminal step
    pub step_reward: f32,
    /// Added to `step_reward` when the step advanced the car
    pub advance_reward: f32,
    pub goal_reward: f32,
    pub collision_reward: f32,
    pub out_of_bounds_reward: f32,
    pub encoding: EncodingMode,
    /// Fixed seed for road generation; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            length: ROAD_LENGTH,
            goal: GOAL,
            density: 0.2,
            max_blocked_per_cell: 2,
            first_obstacle_position: 3,
            start_lane: START_LANE,
            step_reward: -0.05,
            advance_reward: 0.0,
            goal_reward: 100.0,
            collision_reward: -100.0,
            out_of_bounds_reward: -50.0,
            encoding: EncodingMode::Lookahead,
            seed: None,
        }
    }
}

impl RoadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.length < 2 {
            return Err(QlError(format!("road length {} is too short", self.length)).into());
        }
        if self.goal == 0 || self.goal > self.length {
            return Err(QlError(format!("goal {} must be within 1..={}", self.goal, self.length)).into());
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(QlError(format!("obstacle density {} must be within [0, 1]", self.density)).into());
        }
        if !(1..=NUM_LANES).contains(&self.max_blocked_per_cell) {
            return Err(QlError(format!("max_blocked_per_cell {} must be within 1..={}", self.max_blocked_per_cell, NUM_LANES)).into());
        }
        if self.start_lane >= NUM_LANES {
            return Err(QlError(format!("start lane {} does not exist", self.start_lane)).into());
        }
        Ok(())
    }
}

/// Position of the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadState {
    pub position: usize,
    pub lane: usize,
}

impl RoadState {
    pub fn new(
        position: usize,
        lane: usize,
    ) -> Self {
        Self { position, lane }
    }
}

impl Display for RoadState {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "({}, L{})", self.position, self.lane)
    }
}

/// Blocked `(position, lane)` cells of a road, kept in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Obstacles(BTreeSet<(usize, usize)>);

impl Obstacles {
    pub fn new() -> Self { Self::default() }

    pub fn contains(
        &self,
        position: usize,
        lane: usize,
    ) -> bool {
        self.0.contains(&(position, lane))
    }

    pub fn insert(
        &mut self,
        position: usize,
        lane: usize,
    ) {
        self.0.insert((position, lane));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, usize)> { self.0.iter() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<(usize, usize)> for Obstacles {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self { Obstacles(iter.into_iter().collect()) }
}

/// Places obstacles on a road of `length` cells.
///
/// Every interior cell from `first_position` up to (excluding) the final cell gets - with probability `density` -
/// between one and `max_blocked_per_cell` distinct random lanes blocked.
/// A fully blocked position is possible; the road is not guaranteed to be passable.
///
/// Fails for a `density` outside of `[0, 1]` and for `max_blocked_per_cell` outside of `1..=lanes`.
pub fn generate_road<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    lanes: usize,
    density: f64,
    max_blocked_per_cell: usize,
    first_position: usize,
) -> Result<Obstacles> {
    if !(0.0..=1.0).contains(&density) {
        return Err(QlError(format!("obstacle density {} must be within [0, 1]", density)).into());
    }
    if !(1..=lanes).contains(&max_blocked_per_cell) {
        return Err(QlError(format!("max_blocked_per_cell {} must be within 1..={}", max_blocked_per_cell, lanes)).into());
    }

    let mut obstacles = Obstacles::new();
    for position in first_position.max(1)..length.saturating_sub(1) {
        if rng.gen_bool(density) {
            let num_blocked = rng.gen_range(1..=max_blocked_per_cell);
            for lane in rand::seq::index::sample(rng, lanes, num_blocked).into_iter() {
                obstacles.insert(position, lane);
            }
        }
    }
    Ok(obstacles)
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum DriveAction {
    /// One cell forward, same lane
    Advance,
    /// Switch to the given lane without moving forward
    SetLane(u8),
}

impl DriveAction {
    /// Lane change action; fails for lanes the road does not have
    pub fn set_lane(lane: usize) -> Result<Self> {
        match lane < NUM_LANES {
            true => Ok(DriveAction::SetLane(lane as u8)),
            false => Err(QlError(format!("lane {} does not exist", lane)).into()),
        }
    }
}

impl Display for DriveAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DriveAction::Advance => f.write_str("→"),
            DriveAction::SetLane(lane) => write!(f, "L{}", lane),
        }
    }
}

impl Action for DriveAction {
    const ACTION_SPACE: ModelActionType = 1 + NUM_LANES as ModelActionType;

    fn numeric(&self) -> ModelActionType {
        match self {
            DriveAction::Advance => 0,
            // out-of-range lanes stay outside of the action space instead of wrapping around
            DriveAction::SetLane(lane) => lane.saturating_add(1),
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        match value {
            0 => Ok(DriveAction::Advance),
            v if v < Self::ACTION_SPACE => Ok(DriveAction::SetLane(v - 1)),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

/// Outcome of applying one action to a state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next_state: RoadState,
    pub reward: f32,
    pub done: bool,
    pub termination: Option<Termination>,
}

/// Read-only view of the road for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSnapshot {
    pub position: usize,
    pub lane: usize,
    pub obstacles: Obstacles,
    pub goal: usize,
    pub length: usize,
    pub lanes: usize,
}

/// A straight road of `NUM_LANES` lanes with obstacles; the car starts at position 0 and has to reach the goal
/// position without hitting an obstacle.
#[derive(Clone)]
pub struct RoadEnvironment {
    config: RoadConfig,
    encoder: StateEncoder,
    obstacles: Obstacles,
    state: RoadState,
    termination: Option<Termination>,
    rng: StdRng,
}

impl RoadEnvironment {
    /// Environment on a freshly generated road
    pub fn new(config: RoadConfig) -> Result<Self> {
        let mut env = Self::with_obstacles(config, Obstacles::new())?;
        env.regenerate_road()?;
        Ok(env)
    }

    /// Environment on a given road layout
    pub fn with_obstacles(
        config: RoadConfig,
        obstacles: Obstacles,
    ) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let encoder = StateEncoder::new(config.encoding, NUM_LANES, config.length);
        let state = RoadState::new(0, config.start_lane);
        Ok(Self {
            config,
            encoder,
            obstacles,
            state,
            termination: None,
            rng,
        })
    }

    /// Replaces the obstacles with a new random layout and puts the car back to the start
    pub fn regenerate_road(&mut self) -> Result<()> {
        self.obstacles = generate_road(
            &mut self.rng,
            self.config.length,
            NUM_LANES,
            self.config.density,
            self.config.max_blocked_per_cell,
            self.config.first_obstacle_position,
        )?
        .iter()
        .copied()
        .filter(|&(position, _)| position < self.config.goal)
        .collect();
        log::debug!("generated road with {} obstacles", self.obstacles.len());
        self.reset();
        Ok(())
    }

    pub fn config(&self) -> &RoadConfig { &self.config }

    pub fn obstacles(&self) -> &Obstacles { &self.obstacles }

    pub fn goal(&self) -> usize { self.config.goal }

    pub fn start_state(&self) -> RoadState { RoadState::new(0, self.config.start_lane) }

    pub fn encode(
        &self,
        state: &RoadState,
    ) -> StateKey {
        self.encoder.encode(state, &self.obstacles)
    }

    /// Applies `action` to `state` without touching the environment.
    pub fn transition(
        &self,
        state: &RoadState,
        action: DriveAction,
    ) -> Result<Transition> {
        match action {
            DriveAction::Advance => Ok(self.outcome(RoadState::new(state.position + 1, state.lane), true)),
            DriveAction::SetLane(lane) if (lane as usize) < NUM_LANES => {
                Ok(self.outcome(RoadState::new(state.position, lane as usize), false))
            }
            DriveAction::SetLane(lane) => Err(QlError(format!("lane {} does not exist", lane)).into()),
        }
    }

    /// Rewards the car for arriving at `next_state`.
    ///
    /// Checks in this order: obstacle hit, goal reached, left the road; otherwise a plain step.
    pub(crate) fn outcome(
        &self,
        next_state: RoadState,
        advanced: bool,
    ) -> Transition {
        let terminal = |reward, termination| Transition {
            next_state,
            reward,
            done: true,
            termination: Some(termination),
        };

        if self.obstacles.contains(next_state.position, next_state.lane) {
            terminal(self.config.collision_reward, Termination::Crashed)
        } else if next_state.position >= self.config.goal {
            terminal(self.config.goal_reward, Termination::GoalReached)
        } else if next_state.position > self.config.length {
            terminal(self.config.out_of_bounds_reward, Termination::OutOfBounds)
        } else {
            let reward = if advanced {
                self.config.step_reward + self.config.advance_reward
            } else {
                self.config.step_reward
            };
            Transition {
                next_state,
                reward,
                done: false,
                termination: None,
            }
        }
    }

    /// Moves the car according to an already computed transition
    pub(crate) fn apply(
        &mut self,
        t: &Transition,
    ) {
        self.state = t.next_state;
        self.termination = t.termination;
    }

    pub fn snapshot(&self) -> RoadSnapshot {
        RoadSnapshot {
            position: self.state.position,
            lane: self.state.lane,
            obstacles: self.obstacles.clone(),
            goal: self.config.goal,
            length: self.config.length,
            lanes: NUM_LANES,
        }
    }
}

impl Environment for RoadEnvironment {
    type S = RoadState;
    type A = DriveAction;
    type K = StateKey;

    fn reset(&mut self) {
        self.state = self.start_state();
        self.termination = None;
    }

    fn state(&self) -> &Self::S { &self.state }

    fn state_key(&self) -> Self::K { self.encode(&self.state) }

    fn no_action() -> Self::A { DriveAction::Advance }

    fn step(
        &mut self,
        action: Self::A,
    ) -> Result<(&Self::S, f32, bool)> {
        let t = self.transition(&self.state, action)?;
        self.apply(&t);
        Ok((&self.state, t.reward, t.done))
    }

    fn termination(&self) -> Option<Termination> { self.termination }
}
