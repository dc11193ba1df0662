//! Command and snapshot interface of the driving sandbox.
//!
//! A front end (console, GUI, test) owns a [DrivingSandbox], calls [DrivingSandbox::tick] at its own pace and
//! renders [DrivingSandbox::current_state] in between. It never touches the learned table directly.

use anyhow::Result;

use crate::environment::road_environment::{RoadConfig, RoadEnvironment, RoadSnapshot, RoadState};
use crate::ql::learn::tabular_q_learner::{DemoReport, Parameter, TabularQLearner, Tick, TrainingMetrics, TrainingPhase};
use crate::ql::prelude::Environment;

pub struct DrivingSandbox {
    learner: TabularQLearner<RoadEnvironment>,
}

impl DrivingSandbox {
    /// Sandbox on a freshly generated road
    pub fn new(
        road: RoadConfig,
        param: Parameter,
    ) -> Result<Self> {
        let environment = RoadEnvironment::new(road)?;
        Self::with_environment(environment, param)
    }

    pub fn with_environment(
        environment: RoadEnvironment,
        param: Parameter,
    ) -> Result<Self> {
        Ok(Self {
            learner: TabularQLearner::new(environment, param)?,
        })
    }

    /// Car position, road layout and goal for rendering
    pub fn current_state(&self) -> RoadSnapshot { self.learner.environment().snapshot() }

    /// Same road, car placed at `state` - e.g. for rendering a demo trajectory
    pub fn snapshot_at(
        &self,
        state: &RoadState,
    ) -> RoadSnapshot {
        RoadSnapshot {
            position: state.position,
            lane: state.lane,
            ..self.current_state()
        }
    }

    pub fn start_training(&mut self) { self.learner.start() }

    pub fn stop_training(&mut self) { self.learner.stop() }

    pub fn is_training(&self) -> bool {
        matches!(self.learner.phase(), TrainingPhase::RunningEpisode | TrainingPhase::EpisodeDone)
    }

    pub fn phase(&self) -> TrainingPhase { self.learner.phase() }

    /// One training step; a no-op while training is stopped or complete
    pub fn tick(&mut self) -> Result<Tick> { self.learner.tick() }

    /// Runs the remaining training without pausing
    pub fn learn_till_complete(&mut self) -> Result<()> { self.learner.learn_till_complete() }

    /// Stops training and clears all statistics; the table survives only with `keep_table`
    pub fn reset(
        &mut self,
        keep_table: bool,
    ) {
        self.learner.reset(keep_table)
    }

    /// New random obstacle layout, plus a [Self::reset]
    pub fn regenerate_road(
        &mut self,
        keep_table: bool,
    ) -> Result<()> {
        self.learner.environment_mut().regenerate_road()?;
        self.learner.reset(keep_table);
        log::info!("new road with {} obstacles", self.learner.environment().obstacles().len());
        Ok(())
    }

    /// Greedy run of the current policy from the start; learns nothing
    pub fn run_demo(&mut self) -> Result<DemoReport<RoadState>> { self.learner.replay() }

    pub fn metrics(&self) -> TrainingMetrics { self.learner.metrics() }

    /// Position the car is standing on
    pub fn car(&self) -> RoadState { *self.learner.environment().state() }
}
