pub mod batch;
pub mod config;
pub mod core;
pub mod grading;
