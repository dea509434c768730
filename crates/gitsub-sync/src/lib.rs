pub mod engine;
pub mod git_ops;
pub mod normalize;
pub mod report;
pub mod task;
