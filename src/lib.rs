pub mod boundary;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod types;

// Ports and the adapters that implement them
pub mod app;
pub mod infra;

pub mod observability;
