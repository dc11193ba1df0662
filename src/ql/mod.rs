pub mod learn;
pub mod prelude;
