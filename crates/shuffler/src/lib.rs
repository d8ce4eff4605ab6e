//! Configuration and logging setup for the shuffler binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod telemetry;

pub use config::{
    DatabaseConfig, PLACEHOLDER_TOKEN, PoolConfig, ShuffleConfig, ShufflerConfig,
};
pub use telemetry::{LogFormat, init_tracing};
