//! This module contains the definition of the process and the execution result enum
use std::hash::{Hash, Hasher};

use getset::CopyGetters;

use crate::error::{Result, SimulationError};

/// Outcome of executing a process for one cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExecutionResult {
    Continue,
    Done,
}

/// A unit of work consuming a fixed fraction of one CPU while it runs.
///
/// Equality and hashing only look at the identifier.
#[derive(Debug, Clone, CopyGetters)]
pub struct Process {
    #[getset(get_copy = "pub")]
    id: u32,
    #[getset(get_copy = "pub")]
    usage: f64,
    #[getset(get_copy = "pub")]
    remaining_burst_time: u32,
}

impl Process {
    pub fn new(id: u32, usage: f64, burst_time: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&usage) {
            return Err(SimulationError::InvalidUsage(usage));
        }
        if burst_time == 0 {
            return Err(SimulationError::InvalidBurstTime(burst_time));
        }
        Ok(Self {
            id,
            usage,
            remaining_burst_time: burst_time,
        })
    }

    /// Runs the process for one cycle.
    ///
    /// # Panics
    ///
    /// Panics when called on a process that has already finished. A finished
    /// process has to be dropped from every container in the cycle it reports
    /// [`ExecutionResult::Done`].
    pub fn execute(&mut self) -> ExecutionResult {
        assert!(
            self.remaining_burst_time > 0,
            "process {} executed after it finished",
            self.id
        );
        self.remaining_burst_time -= 1;
        if self.remaining_burst_time == 0 {
            ExecutionResult::Done
        } else {
            ExecutionResult::Continue
        }
    }
}

impl PartialEq for Process {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Process {}

impl Hash for Process {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
