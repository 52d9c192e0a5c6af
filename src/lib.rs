pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod storage;
pub mod types;

// Ports at the I/O boundary and their implementations
pub mod app;
pub mod infra;
