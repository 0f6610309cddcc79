//! Composite loggers built over other sinks

pub mod level_filter;
pub mod multiplex;
pub mod tee;

pub use level_filter::{ConstLevelFilter, LevelFilterLogger};
pub use multiplex::MultiplexLogger;
pub use tee::TeeLogger;

pub use crate::core::AsyncLogger;
