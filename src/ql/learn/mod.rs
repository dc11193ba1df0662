pub mod history;
pub mod policy;
pub mod q_table;
pub mod tabular_q_learner;
