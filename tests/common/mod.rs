use log::LevelFilter;
use road_q_learning::environment::road_environment::{Obstacles, RoadConfig, RoadEnvironment};

#[ctor::ctor]
fn init() {
    let _ = env_logger::builder()
        .format_timestamp_secs()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .is_test(true)
        .try_init();
}

/// Default road with a fixed obstacle layout
pub fn fixed_road(obstacles: &[(usize, usize)]) -> RoadEnvironment {
    let config = RoadConfig {
        seed: Some(1),
        ..RoadConfig::default()
    };
    RoadEnvironment::with_obstacles(config, obstacles.iter().copied().collect::<Obstacles>())
        .expect("default road config should be valid")
}
