use std::fmt::{Display, Formatter};

use anyhow::Result;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::ql::learn::history::{EpisodeRecord, RingBuffer, StepRecord};
use crate::ql::learn::policy::EpsilonGreedyPolicy;
use crate::ql::learn::q_table::QTable;
use crate::ql::prelude::{Action, Environment, QlError, Termination};
use crate::util::format_count;

pub struct Parameter {
    /// Learning rate (0 <= 𝛼 <= 1)
    pub alpha: f32,
    /// Discount rate (0 <= 𝛾 <= 1); the bigger, the more farsighted the agent becomes
    pub gamma: f32,
    /// Exploration rate at the start of training
    pub epsilon_max: f64,
    /// Exploration rate never decays below this value
    pub epsilon_min: f64,
    /// Multiplicative exploration decay applied after each episode
    pub epsilon_decay: f64,
    pub max_episodes: usize,
    pub max_steps_per_episode: usize,
    /// Number of recent episodes the average reward is computed over
    pub episode_reward_history_buffer_len: usize,
    pub stats_after_episodes: usize,
    /// Fixed seed for action selection; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.95,
            epsilon_max: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            max_episodes: 1_200,
            max_steps_per_episode: 100,
            episode_reward_history_buffer_len: 50,
            stats_after_episodes: 100,
            seed: None,
        }
    }
}

impl Parameter {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) || !(0.0..=1.0).contains(&self.gamma) {
            return Err(QlError(format!("alpha ({}) and gamma ({}) must be within [0, 1]", self.alpha, self.gamma)).into());
        }
        if !(0.0..=1.0).contains(&self.epsilon_min) || !(self.epsilon_min..=1.0).contains(&self.epsilon_max) {
            return Err(QlError(format!(
                "epsilon bounds must satisfy 0 <= min ({}) <= max ({}) <= 1",
                self.epsilon_min, self.epsilon_max
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&self.epsilon_decay) {
            return Err(QlError(format!("epsilon_decay {} must be within [0, 1]", self.epsilon_decay)).into());
        }
        if self.max_episodes == 0
            || self.max_steps_per_episode == 0
            || self.episode_reward_history_buffer_len == 0
            || self.stats_after_episodes == 0
        {
            return Err(QlError::from("episode budget, step budget, reward window and stats interval must be positive").into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    /// Not started or stopped from outside
    Idle,
    RunningEpisode,
    /// An episode just ended; the next tick starts a new one
    EpisodeDone,
    /// Episode budget exhausted - no further learning until reset
    TrainingComplete,
}

/// Counters over all episodes since the last reset
pub struct TrainingStats {
    episode_count: usize,
    success_count: usize,
    reward_history: RingBuffer<f32>,
    epsilon: f64,
}

impl TrainingStats {
    fn new(
        reward_window: usize,
        epsilon: f64,
    ) -> Self {
        Self {
            episode_count: 0,
            success_count: 0,
            reward_history: RingBuffer::new(reward_window),
            epsilon,
        }
    }

    pub fn episode_count(&self) -> usize { self.episode_count }

    pub fn success_count(&self) -> usize { self.success_count }

    pub fn epsilon(&self) -> f64 { self.epsilon }

    pub fn success_rate_pct(&self) -> f32 {
        match self.episode_count {
            0 => 0.0,
            n => 100.0 * self.success_count as f32 / n as f32,
        }
    }

    /// Moving average over the most recent episode rewards
    pub fn avg_reward(&self) -> f32 { self.reward_history.avg() }

    pub fn min_reward(&self) -> f32 { self.reward_history.min() }

    pub fn metrics(&self) -> TrainingMetrics {
        TrainingMetrics {
            episodes: self.episode_count,
            success_rate_pct: self.success_rate_pct(),
            avg_reward: self.avg_reward(),
            epsilon: self.epsilon,
        }
    }
}

/// The values a front end is entitled to show after an episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingMetrics {
    pub episodes: usize,
    pub success_rate_pct: f32,
    pub avg_reward: f32,
    pub epsilon: f64,
}

impl Display for TrainingMetrics {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "episodes: {}, success rate: {:.1}%, avg reward: {:.1}, 𝜀={:.3}",
            self.episodes, self.success_rate_pct, self.avg_reward, self.epsilon
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    /// 1-based number of the finished episode
    pub episode: usize,
    pub steps: usize,
    pub reward: f32,
    /// `None` when the step budget ran out
    pub termination: Option<Termination>,
}

impl EpisodeSummary {
    pub fn success(&self) -> bool { self.termination == Some(Termination::GoalReached) }
}

/// Result of a single [TabularQLearner::tick]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Nothing happened - training is not running
    Idle,
    Stepped,
    EpisodeFinished(EpisodeSummary),
    TrainingComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoOutcome {
    Success,
    Crash,
    OutOfBounds,
    /// The greedy policy did not end the episode within the step budget
    StepLimit,
}

impl From<Termination> for DemoOutcome {
    fn from(t: Termination) -> Self {
        match t {
            Termination::GoalReached => DemoOutcome::Success,
            Termination::Crashed => DemoOutcome::Crash,
            Termination::OutOfBounds => DemoOutcome::OutOfBounds,
        }
    }
}

impl Display for DemoOutcome {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DemoOutcome::Success => f.write_str("SUCCESS"),
            DemoOutcome::Crash => f.write_str("CRASH"),
            DemoOutcome::OutOfBounds => f.write_str("OUT_OF_BOUNDS"),
            DemoOutcome::StepLimit => f.write_str("STEP_LIMIT"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DemoReport<S> {
    pub outcome: DemoOutcome,
    pub total_reward: f32,
    /// Visited states, starting with the start state
    pub trajectory: Vec<S>,
}

impl<S> DemoReport<S> {
    pub fn steps(&self) -> usize { self.trajectory.len().saturating_sub(1) }
}

/// Tabular Q-learner driving an [Environment] one step per [Self::tick].
///
/// Between two ticks every update is committed - a driver may render the environment or stop the training there.
pub struct TabularQLearner<E: Environment> {
    environment: E,
    param: Parameter,
    policy: EpsilonGreedyPolicy,
    /// Tie-breaks of the demo replay only
    replay_policy: EpsilonGreedyPolicy,
    table: QTable<E::K, E::A>,
    stats: TrainingStats,
    phase: TrainingPhase,
    episode: EpisodeRecord<E::K, E::A>,
    step_count: usize,
    action_counts: FxHashMap<E::A, usize>,
}

impl<E: Environment> TabularQLearner<E> {
    pub fn new(
        environment: E,
        param: Parameter,
    ) -> Result<Self> {
        param.validate()?;
        let stats = TrainingStats::new(param.episode_reward_history_buffer_len, param.epsilon_max);
        let policy = EpsilonGreedyPolicy::new(param.seed);
        let replay_policy = EpsilonGreedyPolicy::new(param.seed);
        Ok(Self {
            environment,
            param,
            policy,
            replay_policy,
            table: QTable::new(),
            stats,
            phase: TrainingPhase::Idle,
            episode: EpisodeRecord::new(),
            step_count: 0,
            action_counts: FxHashMap::default(),
        })
    }

    pub fn phase(&self) -> TrainingPhase { self.phase }

    pub fn param(&self) -> &Parameter { &self.param }

    pub fn stats(&self) -> &TrainingStats { &self.stats }

    pub fn metrics(&self) -> TrainingMetrics { self.stats.metrics() }

    pub fn table(&self) -> &QTable<E::K, E::A> { &self.table }

    pub fn environment(&self) -> &E { &self.environment }

    /// Mutable access to the world; the running episode is abandoned
    pub fn environment_mut(&mut self) -> &mut E {
        self.abandon_episode();
        &mut self.environment
    }

    /// Number of steps taken in the running episode
    pub fn episode_steps(&self) -> usize { self.episode.len() }

    /// Starts (or resumes) training with a fresh episode
    pub fn start(&mut self) {
        match self.phase {
            TrainingPhase::Idle => {
                self.begin_episode();
                log::debug!("training started at episode {}", self.stats.episode_count + 1);
            }
            TrainingPhase::TrainingComplete => log::info!("training already complete - reset to train again"),
            TrainingPhase::RunningEpisode | TrainingPhase::EpisodeDone => (),
        }
    }

    /// Stops training between two steps. The unfinished episode is not counted.
    pub fn stop(&mut self) {
        if let TrainingPhase::RunningEpisode | TrainingPhase::EpisodeDone = self.phase {
            log::debug!(
                "training stopped after {} episodes ({} steps of the running episode discarded)",
                self.stats.episode_count,
                self.episode.len()
            );
            self.episode.clear();
            self.phase = TrainingPhase::Idle;
        }
    }

    /// Clears statistics and the running episode; keeps learned values if `keep_table` is set
    pub fn reset(
        &mut self,
        keep_table: bool,
    ) {
        self.abandon_episode();
        self.stats = TrainingStats::new(self.param.episode_reward_history_buffer_len, self.param.epsilon_max);
        self.step_count = 0;
        self.action_counts.clear();
        if !keep_table {
            self.table.clear();
        }
        log::debug!("learner reset (table kept: {})", keep_table);
    }

    /// Advances training by exactly one environment step.
    pub fn tick(&mut self) -> Result<Tick> {
        match self.phase {
            TrainingPhase::Idle => Ok(Tick::Idle),
            TrainingPhase::TrainingComplete => Ok(Tick::TrainingComplete),
            TrainingPhase::EpisodeDone => {
                self.begin_episode();
                self.step()
            }
            TrainingPhase::RunningEpisode => self.step(),
        }
    }

    /// Runs ticks until the current episode has finished
    pub fn learn_episode(&mut self) -> Result<EpisodeSummary> {
        if self.phase == TrainingPhase::TrainingComplete {
            return Err(QlError::from("training already complete").into());
        }
        self.start();
        loop {
            if let Tick::EpisodeFinished(summary) = self.tick()? {
                return Ok(summary);
            }
        }
    }

    /// Runs ticks until the episode budget is exhausted
    pub fn learn_till_complete(&mut self) -> Result<()> {
        self.start();
        while self.phase != TrainingPhase::TrainingComplete {
            self.tick()?;
        }
        Ok(())
    }

    fn begin_episode(&mut self) {
        self.environment.reset();
        self.episode.clear();
        self.phase = TrainingPhase::RunningEpisode;
    }

    fn abandon_episode(&mut self) {
        self.episode.clear();
        self.environment.reset();
        self.phase = TrainingPhase::Idle;
    }

    fn step(&mut self) -> Result<Tick> {
        let state = self.environment.state_key();
        let action = self.policy.choose_action(&self.table, &state, self.stats.epsilon)?;

        let (_, reward, done) = self.environment.step(action)?;
        let next_state = self.environment.state_key();
        log::trace!("{}: step with action {} resulted in reward: {:.2}, done: {}", self.episode.len() + 1, action, reward, done);

        self.table.update(&state, action, reward, &next_state, done, self.param.alpha, self.param.gamma)?;
        self.episode.add(StepRecord {
            state,
            action,
            reward,
            next_state,
            done,
        });
        self.step_count += 1;
        *self.action_counts.entry(action).or_insert(0) += 1;

        if done || self.episode.len() >= self.param.max_steps_per_episode {
            Ok(Tick::EpisodeFinished(self.finish_episode()))
        } else {
            Ok(Tick::Stepped)
        }
    }

    fn finish_episode(&mut self) -> EpisodeSummary {
        let termination = if self.episode.ended() { self.environment.termination() } else { None };
        let reward = self.episode.cumulative_reward();
        let steps = self.episode.len();
        self.episode.clear();

        let stats = &mut self.stats;
        stats.reward_history.add(reward);
        stats.episode_count += 1;
        if termination == Some(Termination::GoalReached) {
            stats.success_count += 1;
        }
        stats.epsilon = f64::max(self.param.epsilon_min, stats.epsilon * self.param.epsilon_decay);

        let summary = EpisodeSummary {
            episode: stats.episode_count,
            steps,
            reward,
            termination,
        };
        log::debug!(
            "episode {} ended after {} steps ({}), reward: {:.2}",
            summary.episode,
            steps,
            termination.map_or("step budget exhausted".to_string(), |t| t.to_string()),
            reward
        );

        if stats.episode_count % self.param.stats_after_episodes == 0 {
            self.learning_update_log();
        }

        if self.stats.episode_count >= self.param.max_episodes {
            self.phase = TrainingPhase::TrainingComplete;
            log::info!("training complete after {} episodes: {}", self.stats.episode_count, self.metrics());
        } else {
            self.phase = TrainingPhase::EpisodeDone;
        }
        summary
    }

    /// Greedy replay of the learned policy on a copy of the environment.
    ///
    /// Neither the table nor the training state is touched. States the table has never seen are
    /// answered with [Environment::no_action].
    pub fn replay(&mut self) -> Result<DemoReport<E::S>>
    where
        E: Clone,
    {
        let mut env = self.environment.clone();
        env.reset();

        let mut trajectory = vec![env.state().clone()];
        let mut total_reward = 0.0;
        for _ in 0..self.param.max_steps_per_episode {
            let key = env.state_key();
            let action = if self.table.knows(&key) {
                self.replay_policy.greedy_action(&self.table, &key)?
            } else {
                E::no_action()
            };
            let (state, reward, done) = env.step(action)?;
            trajectory.push(state.clone());
            total_reward += reward;
            if done {
                let outcome = env.termination().map_or(DemoOutcome::StepLimit, DemoOutcome::from);
                log::info!("demo ended after {} steps: {}", trajectory.len() - 1, outcome);
                return Ok(DemoReport {
                    outcome,
                    total_reward,
                    trajectory,
                });
            }
        }
        log::info!("demo did not finish within {} steps", self.param.max_steps_per_episode);
        Ok(DemoReport {
            outcome: DemoOutcome::StepLimit,
            total_reward,
            trajectory,
        })
    }

    fn learning_update_log(&self) {
        let total_actions: usize = self.action_counts.values().sum();
        let action_distribution_line = self
            .action_counts
            .iter()
            .sorted_by_key(|(action, _)| action.numeric())
            .map(|(&action, &count)| {
                let ratio = 100.0 * count as f32 / total_actions.max(1) as f32;
                format!("{} {:.1}%", action, ratio)
            })
            .join(", ");

        log::info!(
            "\n\
    episode: {}, steps: {}, 𝛼={:.2}, 𝛾={:.2}, 𝜀={:.3}, success rate: {:.1}%, rewards (last {}): {{mean: {:.1}, low: {:.1}}}\n\
    table: {} entries over {} states\n\
    action_distribution (of {}): {}",
            format_count(self.stats.episode_count),
            format_count(self.step_count),
            self.param.alpha,
            self.param.gamma,
            self.stats.epsilon,
            self.stats.success_rate_pct(),
            self.stats.reward_history.len(),
            self.stats.avg_reward(),
            self.stats.min_reward(),
            format_count(self.table.len()),
            format_count(self.table.state_count()),
            format_count(total_actions),
            action_distribution_line
        );
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::environment::road_environment::{DriveAction, Obstacles, RoadConfig, RoadEnvironment, RoadState, GOAL};

    use super::*;

    fn learner(
        obstacles: &[(usize, usize)],
        param: Parameter,
    ) -> Result<TabularQLearner<RoadEnvironment>> {
        let mut config = RoadConfig::default();
        config.seed = Some(17);
        let env = RoadEnvironment::with_obstacles(config, obstacles.iter().copied().collect::<Obstacles>())?;
        TabularQLearner::new(env, param)
    }

    fn seeded_param() -> Parameter {
        Parameter {
            seed: Some(4711),
            ..Parameter::default()
        }
    }

    #[test]
    fn test_phases() -> Result<()> {
        let mut learner = learner(&[], seeded_param())?;
        assert_eq!(learner.phase(), TrainingPhase::Idle);
        assert_eq!(learner.tick()?, Tick::Idle);
        assert_eq!(learner.environment().state(), &RoadState::new(0, 1));

        learner.start();
        assert_eq!(learner.phase(), TrainingPhase::RunningEpisode);
        assert_eq!(learner.tick()?, Tick::Stepped);
        assert_eq!(learner.episode_steps(), 1);

        learner.stop();
        assert_eq!(learner.phase(), TrainingPhase::Idle);
        assert_eq!(learner.tick()?, Tick::Idle);
        assert_eq!(learner.stats().episode_count(), 0);
        assert_eq!(learner.episode_steps(), 0);
        // the committed update of the first step survives the stop
        assert_eq!(learner.table().len(), 1);
        Ok(())
    }

    #[test]
    fn test_episode_done_then_next_episode() -> Result<()> {
        let mut learner = learner(&[], seeded_param())?;
        let summary = learner.learn_episode()?;
        assert_eq!(summary.episode, 1);
        assert_eq!(learner.phase(), TrainingPhase::EpisodeDone);
        assert_eq!(learner.stats().episode_count(), 1);
        assert_eq!(learner.tick()?, Tick::Stepped);
        assert_eq!(learner.phase(), TrainingPhase::RunningEpisode);
        assert_eq!(learner.episode_steps(), 1);
        Ok(())
    }

    #[test]
    fn test_step_budget_ends_episode_as_failure() -> Result<()> {
        let param = Parameter {
            max_steps_per_episode: 3,
            ..seeded_param()
        };
        let mut learner = learner(&[], param)?;
        for _ in 0..10 {
            let summary = learner.learn_episode()?;
            assert_eq!(summary.steps, 3);
            assert_eq!(summary.termination, None);
            assert!(!summary.success());
        }
        assert_eq!(learner.stats().episode_count(), 10);
        assert_eq!(learner.stats().success_count(), 0);
        assert_eq!(learner.metrics().success_rate_pct, 0.0);
        Ok(())
    }

    #[test]
    fn test_crash_counts_as_failure() -> Result<()> {
        // every lane blocked right after the start
        let param = Parameter {
            max_steps_per_episode: 1_000,
            ..seeded_param()
        };
        let mut learner = learner(&[(1, 0), (1, 1), (1, 2)], param)?;
        let summary = learner.learn_episode()?;
        assert_eq!(summary.termination, Some(Termination::Crashed));
        assert!(summary.reward <= -100.0);
        assert_eq!(learner.stats().success_count(), 0);
        Ok(())
    }

    #[test]
    fn test_epsilon_decays_monotonically_to_floor() -> Result<()> {
        let param = Parameter {
            epsilon_decay: 0.7,
            epsilon_min: 0.05,
            max_steps_per_episode: 5,
            ..seeded_param()
        };
        let mut learner = learner(&[], param)?;
        let mut last = learner.stats().epsilon();
        assert_eq!(last, 1.0);
        for _ in 0..30 {
            learner.learn_episode()?;
            let epsilon = learner.stats().epsilon();
            assert!(epsilon <= last);
            assert!(epsilon >= 0.05);
            last = epsilon;
        }
        assert_eq!(last, 0.05);
        Ok(())
    }

    #[test]
    fn test_training_completes_at_episode_budget() -> Result<()> {
        let param = Parameter {
            max_episodes: 7,
            ..seeded_param()
        };
        let mut learner = learner(&[(6, 1)], param)?;
        learner.learn_till_complete()?;
        assert_eq!(learner.phase(), TrainingPhase::TrainingComplete);
        assert_eq!(learner.stats().episode_count(), 7);

        let epsilon = learner.stats().epsilon();
        let table = learner.table().clone();
        assert_eq!(learner.tick()?, Tick::TrainingComplete);
        learner.start();
        assert_eq!(learner.tick()?, Tick::TrainingComplete);
        assert_eq!(learner.stats().epsilon(), epsilon);
        assert_eq!(learner.table().len(), table.len());
        assert!(learner.learn_episode().is_err());
        Ok(())
    }

    #[test]
    fn test_metrics_after_episodes() -> Result<()> {
        let param = Parameter {
            max_steps_per_episode: 2,
            episode_reward_history_buffer_len: 3,
            ..seeded_param()
        };
        let mut learner = learner(&[], param)?;
        let rewards: Vec<f32> = (0..5).map(|_| learner.learn_episode().map(|s| s.reward)).collect::<Result<_>>()?;
        let metrics = learner.metrics();
        assert_eq!(metrics.episodes, 5);
        let expected_avg = rewards[2..].iter().sum::<f32>() / 3.0;
        assert!((metrics.avg_reward - expected_avg).abs() < 1e-5);
        assert!((metrics.epsilon - 0.995_f64.powi(5)).abs() < 1e-9);
        Ok(())
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn test_untrained_replay_drives_straight_to_goal(#[case] start_lane: usize) -> Result<()> {
        let mut config = RoadConfig::default();
        config.start_lane = start_lane;
        let env = RoadEnvironment::with_obstacles(config, Obstacles::new())?;
        let mut learner = TabularQLearner::new(env, seeded_param())?;

        let report = learner.replay()?;
        assert_eq!(report.outcome, DemoOutcome::Success);
        assert_eq!(report.steps(), GOAL);
        assert!(report.trajectory.iter().all(|s| s.lane == start_lane));
        assert!(learner.table().is_empty());
        Ok(())
    }

    #[test]
    fn test_untrained_replay_crashes_into_obstacle() -> Result<()> {
        let mut learner = learner(&[(5, 1)], seeded_param())?;
        let report = learner.replay()?;
        assert_eq!(report.outcome, DemoOutcome::Crash);
        assert_eq!(report.trajectory.last(), Some(&RoadState::new(5, 1)));
        Ok(())
    }

    #[test]
    fn test_replay_leaves_training_untouched() -> Result<()> {
        let mut learner = learner(&[(5, 1)], seeded_param())?;
        learner.learn_episode()?;
        learner.tick()?;
        let state = *learner.environment().state();
        let steps = learner.episode_steps();
        let entries = learner.table().len();

        learner.replay()?;

        assert_eq!(learner.environment().state(), &state);
        assert_eq!(learner.episode_steps(), steps);
        assert_eq!(learner.table().len(), entries);
        assert_eq!(learner.phase(), TrainingPhase::RunningEpisode);
        assert_eq!(learner.stats().episode_count(), 1);
        Ok(())
    }

    #[test]
    fn test_replay_does_not_alter_seeded_training() -> Result<()> {
        let mut with_demo = learner(&[(5, 1), (9, 0)], seeded_param())?;
        let mut without_demo = learner(&[(5, 1), (9, 0)], seeded_param())?;
        for _ in 0..30 {
            with_demo.learn_episode()?;
            without_demo.learn_episode()?;
        }

        with_demo.replay()?;
        with_demo.replay()?;

        for _ in 0..30 {
            let a = with_demo.learn_episode()?;
            let b = without_demo.learn_episode()?;
            assert_eq!(a, b);
        }
        assert_eq!(with_demo.table(), without_demo.table());
        Ok(())
    }

    #[test]
    fn test_replay_step_limit_on_lane_change_loop() -> Result<()> {
        let mut learner = learner(&[], seeded_param())?;
        let env = learner.environment().clone();
        // teach the start state that changing lanes is best - and the state after that as well
        for lane in 0..3 {
            let key = env.encode(&RoadState::new(0, lane));
            learner.table.set(&key, DriveAction::set_lane((lane + 1) % 3)?, 1.0)?;
        }
        let report = learner.replay()?;
        assert_eq!(report.outcome, DemoOutcome::StepLimit);
        assert_eq!(report.steps(), learner.param().max_steps_per_episode);
        Ok(())
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_reset(#[case] keep_table: bool) -> Result<()> {
        let mut learner = learner(&[], seeded_param())?;
        for _ in 0..3 {
            learner.learn_episode()?;
        }
        let table = learner.table().clone();
        assert!(!table.is_empty());

        learner.reset(keep_table);

        assert_eq!(learner.phase(), TrainingPhase::Idle);
        assert_eq!(learner.metrics().episodes, 0);
        assert_eq!(learner.metrics().avg_reward, 0.0);
        assert_eq!(learner.stats().epsilon(), 1.0);
        assert_eq!(learner.table().is_empty(), !keep_table);
        if keep_table {
            assert_eq!(learner.table().len(), table.len());
        }
        Ok(())
    }

    #[test]
    fn test_invalid_parameter_rejected() -> Result<()> {
        let env = RoadEnvironment::new(RoadConfig::default())?;
        let param = Parameter {
            epsilon_min: 0.5,
            epsilon_max: 0.1,
            ..Parameter::default()
        };
        assert!(TabularQLearner::new(env.clone(), param).is_err());
        let param = Parameter {
            max_episodes: 0,
            ..Parameter::default()
        };
        assert!(TabularQLearner::new(env, param).is_err());
        Ok(())
    }
}
