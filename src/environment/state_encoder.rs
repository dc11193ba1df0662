use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::environment::road_environment::{Obstacles, RoadState};

/// Number of cells ahead of the car, which are part of the state key
pub const LOOKAHEAD_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// position, lane and the obstacles within the next `LOOKAHEAD_WINDOW` cells of every lane
    Lookahead,
    /// position and lane only - the table then learns a single road layout by heart
    Positional,
}

/// Discrete table key for a car position.
///
/// `lookahead` holds per lane the sorted offsets (`1..=LOOKAHEAD_WINDOW`) of upcoming obstacles;
/// an empty list marks a clear lane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub position: usize,
    pub lane: usize,
    pub lookahead: Option<Vec<Vec<u8>>>,
}

impl Display for StateKey {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}-{}", self.position, self.lane)?;
        if let Some(lookahead) = &self.lookahead {
            let lanes = lookahead
                .iter()
                .map(|offsets| match offsets.is_empty() {
                    true => "(0,)".to_string(),
                    false => format!("({},)", offsets.iter().join(",")),
                })
                .join(", ");
            write!(f, "-({})", lanes)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StateEncoder {
    mode: EncodingMode,
    lanes: usize,
    road_length: usize,
}

impl StateEncoder {
    pub fn new(
        mode: EncodingMode,
        lanes: usize,
        road_length: usize,
    ) -> Self {
        Self { mode, lanes, road_length }
    }

    pub fn mode(&self) -> EncodingMode { self.mode }

    pub fn encode(
        &self,
        state: &RoadState,
        obstacles: &Obstacles,
    ) -> StateKey {
        let lookahead = match self.mode {
            EncodingMode::Lookahead => Some(self.obstacles_ahead(state.position, obstacles)),
            EncodingMode::Positional => None,
        };
        StateKey {
            position: state.position,
            lane: state.lane,
            lookahead,
        }
    }

    /// Per lane: offsets of obstacles within the window ahead of `position`, cut at the end of the road
    fn obstacles_ahead(
        &self,
        position: usize,
        obstacles: &Obstacles,
    ) -> Vec<Vec<u8>> {
        let window_end = usize::min(position + LOOKAHEAD_WINDOW + 1, self.road_length);
        (0..self.lanes)
            .map(|lane| {
                (position + 1..window_end)
                    .filter(|&p| obstacles.contains(p, lane))
                    .map(|p| (p - position) as u8)
                    .collect()
            })
            .collect()
    }
}
