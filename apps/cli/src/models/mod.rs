pub mod args;
pub mod plan;
