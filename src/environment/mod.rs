pub mod road_drawer;
pub mod road_environment;
pub mod state_encoder;
pub mod steering_environment;
