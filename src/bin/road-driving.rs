use std::io::Write;

use anyhow::Result;

use road_q_learning::environment::road_environment::RoadConfig;
use road_q_learning::ql::learn::tabular_q_learner::{DemoOutcome, Parameter, Tick};
use road_q_learning::ql::prelude::DebugVisualizer;
use road_q_learning::sandbox::DrivingSandbox;
use road_q_learning::util::init_logging;

/// Tries a few roads, because a generated road is not guaranteed to be passable
const MAX_ROADS: usize = 5;

fn main() -> Result<()> {
    init_logging();

    let mut sandbox = DrivingSandbox::new(RoadConfig::default(), Parameter::default())?;

    for road in 1..=MAX_ROADS {
        let stdout = std::io::stdout();
        writeln!(&stdout, "road {}:", road)?;
        sandbox.current_state().render_to_console().draw();
        writeln!(&stdout, "\n-----")?;

        sandbox.start_training();
        loop {
            match sandbox.tick()? {
                Tick::EpisodeFinished(summary) => log::trace!("{:?} | {}", summary, sandbox.metrics()),
                Tick::TrainingComplete | Tick::Idle => break,
                Tick::Stepped => (),
            }
        }
        log::info!("{}", sandbox.metrics());

        let report = sandbox.run_demo()?;
        for (step, state) in report.trajectory.iter().enumerate() {
            let snapshot = sandbox.snapshot_at(state);
            writeln!(&stdout, "step {}: {}", step, snapshot.one_line_info())?;
            snapshot.render_to_console().draw();
            writeln!(&stdout, "\n-----")?;
        }
        writeln!(&stdout, "demo outcome: {} (reward {:.2})", report.outcome, report.total_reward)?;

        if report.outcome == DemoOutcome::Success {
            break;
        }
        sandbox.regenerate_road(false)?;
    }

    Ok(())
}
