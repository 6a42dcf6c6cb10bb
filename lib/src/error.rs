//! Error type shared by every constructor of the simulation core.
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("process usage must be within [0, 1], got {0}")]
    InvalidUsage(f64),

    #[error("process burst time must be positive, got {0}")]
    InvalidBurstTime(u32),

    #[error("a machine needs at least one CPU, got {0}")]
    InvalidCpuCount(usize),

    #[error("{schedules} schedule queues cannot be assigned 1:1 to {cpus} CPUs")]
    ScheduleCountMismatch { cpus: usize, schedules: usize },

    #[error("inverted {name} range: min {min} is greater than max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("usage threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("process portion must be within [0, 1], got {0}")]
    InvalidPortion(f64),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
