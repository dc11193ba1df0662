pub mod environment;
pub mod ql;
pub mod sandbox;
pub mod util;
